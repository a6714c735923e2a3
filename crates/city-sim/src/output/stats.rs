//! Statistics Output
//!
//! Collects metric ranges over a run and writes the run summary.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use city_model::{Metric, MetricsSnapshot};

use super::OutputError;

/// Minimum, maximum and mean of one metric over a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Overall run statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_ticks: u64,
    pub income: Option<MetricRange>,
    pub happiness: Option<MetricRange>,
    pub wellness: Option<MetricRange>,
    pub peak_population: u32,
    pub final_snapshot: Option<MetricsSnapshot>,
}

/// Running accumulator for one metric
#[derive(Debug, Clone, Default)]
struct Accumulator {
    min: f64,
    max: f64,
    sum: f64,
    count: u64,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.sum += value;
        self.count += 1;
    }

    fn range(&self) -> Option<MetricRange> {
        if self.count == 0 {
            return None;
        }
        Some(MetricRange {
            min: self.min,
            max: self.max,
            mean: self.sum / self.count as f64,
        })
    }
}

/// Resource to accumulate statistics during a run
#[derive(Resource, Debug, Default)]
pub struct StatsCollector {
    ticks: u64,
    metrics: [Accumulator; 3],
    peak_population: u32,
    last: Option<MetricsSnapshot>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tick's snapshot
    pub fn record_tick(&mut self, snapshot: &MetricsSnapshot) {
        self.ticks += 1;
        for (slot, metric) in Metric::ALL.iter().enumerate() {
            self.metrics[slot].push(snapshot.get(*metric));
        }
        self.peak_population = self.peak_population.max(snapshot.population);
        self.last = Some(*snapshot);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Generate the run summary
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total_ticks: self.ticks,
            income: self.metrics[0].range(),
            happiness: self.metrics[1].range(),
            wellness: self.metrics[2].range(),
            peak_population: self.peak_population,
            final_snapshot: self.last,
        }
    }
}

/// Write the run summary as pretty JSON
pub fn write_summary(summary: &RunSummary, path: impl AsRef<Path>) -> Result<(), OutputError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json)?;
    Ok(())
}
