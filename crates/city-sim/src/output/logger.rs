//! Metrics Logger
//!
//! Append-only JSONL metrics log, one line per tick.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use city_model::MetricsSnapshot;

use super::OutputError;

/// One line of the metrics log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickMetrics {
    pub tick: u64,
    #[serde(flatten)]
    pub snapshot: MetricsSnapshot,
    pub active_buildings: usize,
    pub influence_pairs: usize,
}

/// Resource for logging tick metrics to a JSONL file
#[derive(Resource)]
pub struct MetricsLogger {
    writer: Option<BufWriter<File>>,
    line_count: u64,
}

impl MetricsLogger {
    /// Create a new logger writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> Result<Self, OutputError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            line_count: 0,
        })
    }

    /// Create a logger that discards lines
    pub fn null() -> Self {
        Self {
            writer: None,
            line_count: 0,
        }
    }

    /// Number of lines logged so far
    pub fn line_count(&self) -> u64 {
        self.line_count
    }

    pub fn log(&mut self, line: &TickMetrics) -> Result<(), OutputError> {
        self.line_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(line)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> Result<(), OutputError> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for MetricsLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush metrics log: {}", e);
        }
    }
}

/// Reads a metrics log back, one entry per non-empty line.
pub fn read_metrics_log(path: impl AsRef<Path>) -> Result<Vec<TickMetrics>, OutputError> {
    let content = std::fs::read_to_string(path)?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(OutputError::from))
        .collect()
}
