//! Sample data fixtures for testing.
//!
//! This module provides ready-made layouts for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // city-model = { path = "../city-model", features = ["test-fixtures"] }
//!
//! use city_model::fixtures;
//!
//! let layout = fixtures::sample_layout();
//! ```

use crate::{Building, BuildingId, BuildingType, CityLayout, Tile};

/// Returns the sample layout from the fixtures file.
///
/// A 16x16 grid with a cross-shaped road (row y=5, column x=6) and:
/// - 3 houses (`bld_00008` sits off-road and is never active)
/// - 1 office, 1 factory, 1 mall
/// - 1 park, 1 hospital
pub fn sample_layout() -> CityLayout {
    let json = include_str!("../tests/fixtures/sample_layout.json");
    serde_json::from_str(json).expect("Failed to parse sample_layout.json")
}

/// Id of the off-road house in [`sample_layout`].
pub fn disconnected_house_id() -> BuildingId {
    BuildingId::from("bld_00008")
}

/// A house and a factory sharing one straight road, `gap` road tiles apart.
///
/// The house stands above the road's first tile and the factory above its
/// last, so the road distance between them is exactly `gap`.
pub fn house_and_factory(gap: u32) -> CityLayout {
    let mut layout = CityLayout::new(gap + 3, 3);
    layout
        .road_row(1, 1, 1 + gap)
        .place(Building::new("bld_00001", BuildingType::House), Tile::new(1, 0))
        .place(
            Building::new("bld_00002", BuildingType::Factory),
            Tile::new(1 + gap, 0),
        );
    layout
}
