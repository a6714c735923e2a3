//! City simulation driver.
//!
//! Hosts the metrics engine in an ECS world: a grid road network, buildings
//! as entities, scenario edits between ticks and per-tick output.

pub mod city;
pub mod generate;
pub mod inspect;
pub mod output;
pub mod roads;
pub mod scenario;

pub use city::{City, CityClock, Engine, LatestMetrics, Lot, Structure};
pub use generate::{generate_city, GeneratorConfig};
pub use inspect::{format_reports, inspect, BuildingReport};
pub use output::{
    read_metrics_log, write_summary, MetricRange, MetricsLogger, OutputError, RunSummary,
    StatsCollector, TickMetrics,
};
pub use roads::GridRoads;
pub use scenario::{apply_edit, Edit, Scenario, ScenarioError, TimedEdit};
