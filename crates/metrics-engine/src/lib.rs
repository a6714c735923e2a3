//! Influence-based city metrics.
//!
//! Turns building placement, building category and road distance into
//! per-tick income, happiness, wellness and population. Each evaluation is
//! one synchronous pass over a borrowed view of the city:
//!
//! ```text
//! buildings + roads ──▶ activity ──▶ influence table ──▶ aggregate ──▶ snapshot
//!                                           │
//!                                           └──▶ accessibility (on demand)
//! ```
//!
//! # Modules
//!
//! - [`coefficients`]: Tuning constants and contribution tables loaded from TOML
//! - [`road`]: The road graph the host supplies
//! - [`activity`]: Road connection flags
//! - [`influence`]: Distance-decayed pairwise weights
//! - [`aggregate`]: Snapshot computation
//! - [`access`]: Per-building accessibility primitives

pub mod access;
pub mod activity;
pub mod aggregate;
pub mod coefficients;
pub mod influence;
pub mod road;

// Re-export coefficient types
pub use coefficients::{
    default_tuning_toml, BaseContribution, CoefficientProvider, CoefficientSet, ConfigError,
    Globals, PairwiseMatrix, PairwiseTables, TomlSerializeError,
};

// Re-export pipeline stages
pub use access::{Accessibility, LEISURE_CAP, LEISURE_SCALE, LEISURE_TYPES, NEAR_PENALTY_RANGE};
pub use activity::resolve_activity;
pub use aggregate::aggregate;
pub use influence::{exponential_falloff, InfluenceEntry, InfluenceTable, PairKey};
pub use road::RoadGraph;

use std::path::Path;

use city_model::{Building, MetricsSnapshot};
use tracing::debug;

/// Errors that can occur when setting up the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Coefficients could not be loaded or are unusable
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Everything one evaluation produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub snapshot: MetricsSnapshot,
    pub table: InfluenceTable,
    pub active_count: usize,
}

impl Evaluation {
    /// Accessibility queries over this evaluation's influence table.
    ///
    /// `buildings` must be the slice that was evaluated.
    pub fn accessibility<'a>(&'a self, buildings: &'a [Building]) -> Accessibility<'a> {
        Accessibility::new(buildings, &self.table)
    }
}

/// Runs the activity, influence and aggregation stages in order.
#[derive(Debug, Clone)]
pub struct MetricsEngine<P: CoefficientProvider = CoefficientSet> {
    provider: P,
}

impl<P: CoefficientProvider> MetricsEngine<P> {
    /// Creates an engine after validating the provider's coefficients.
    pub fn new(provider: P) -> Result<Self, EngineError> {
        provider.model().validate()?;
        Ok(Self { provider })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Evaluates one tick.
    ///
    /// Rewrites every building's `active` flag, then builds the influence
    /// table and aggregates it. Never fails; anomalies contribute nothing.
    pub fn evaluate<R: RoadGraph>(&self, buildings: &mut [Building], roads: &R) -> Evaluation {
        let active_count = resolve_activity(buildings, roads);
        let table = InfluenceTable::build(buildings, roads, &self.provider.model().globals);
        let snapshot = aggregate(buildings, &table, &self.provider);

        debug!(
            "Evaluated {} buildings ({} active, {} influence pairs): {}",
            buildings.len(),
            active_count,
            table.len(),
            snapshot
        );

        Evaluation {
            snapshot,
            table,
            active_count,
        }
    }
}

impl MetricsEngine<CoefficientSet> {
    /// Creates an engine from a TOML coefficient file.
    pub fn from_config_file(path: &Path) -> Result<Self, EngineError> {
        let coefficients = CoefficientSet::from_file(path)?;
        Self::new(coefficients)
    }

    /// Creates an engine with the default coefficients.
    pub fn with_defaults() -> Self {
        Self::new(CoefficientSet::default()).expect("Default coefficients should always validate")
    }
}
