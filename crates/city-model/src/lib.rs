//! Shared city data types for the influence simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod building;
pub mod layout;
pub mod metrics;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export building types
pub use building::{
    generate_building_id, Building, BuildingId, BuildingMeta, BuildingType, Category,
    ParseKindError, Task,
};

// Re-export layout types
pub use layout::{CityLayout, LayoutError, PlacedBuilding, Tile, DEFAULT_GRID_SIZE};

// Re-export metric types
pub use metrics::{Metric, MetricsSnapshot, POPULATION_PER_HOUSE};
