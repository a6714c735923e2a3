//! Layout Types
//!
//! Serializable description of a city on a tile grid: which tiles are road
//! and where each building stands. Used for scenario files and fixtures.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{Building, BuildingId};

/// Default grid edge length in tiles.
pub const DEFAULT_GRID_SIZE: u32 = 28;

/// A grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
}

impl Tile {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// 4-connected neighbours, skipping coordinates below zero.
    pub fn neighbors4(&self) -> impl Iterator<Item = Tile> {
        let Tile { x, y } = *self;
        [
            x.checked_sub(1).map(|nx| Tile::new(nx, y)),
            y.checked_sub(1).map(|ny| Tile::new(x, ny)),
            x.checked_add(1).map(|nx| Tile::new(nx, y)),
            y.checked_add(1).map(|ny| Tile::new(x, ny)),
        ]
        .into_iter()
        .flatten()
    }
}

/// A building together with the tile it occupies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedBuilding {
    #[serde(flatten)]
    pub building: Building,
    pub tile: Tile,
}

impl PlacedBuilding {
    pub fn new(building: Building, tile: Tile) -> Self {
        Self { building, tile }
    }
}

/// Errors found when validating a layout.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("tile ({}, {}) is outside the {width}x{height} grid", .tile.x, .tile.y)]
    OutOfBounds { tile: Tile, width: u32, height: u32 },
    #[error("tile ({}, {}) is already occupied", .tile.x, .tile.y)]
    Occupied { tile: Tile },
    #[error("building id '{0}' is used more than once")]
    DuplicateId(BuildingId),
    #[error("no building with id '{0}'")]
    UnknownBuilding(BuildingId),
    #[error("grid dimensions must be non-zero")]
    EmptyGrid,
}

/// A complete city: grid bounds, road tiles and placed buildings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityLayout {
    #[serde(default = "default_grid_size")]
    pub width: u32,
    #[serde(default = "default_grid_size")]
    pub height: u32,
    #[serde(default)]
    pub roads: Vec<Tile>,
    #[serde(default)]
    pub buildings: Vec<PlacedBuilding>,
}

fn default_grid_size() -> u32 {
    DEFAULT_GRID_SIZE
}

impl Default for CityLayout {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE, DEFAULT_GRID_SIZE)
    }
}

impl CityLayout {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            roads: Vec::new(),
            buildings: Vec::new(),
        }
    }

    pub fn in_bounds(&self, tile: Tile) -> bool {
        tile.x < self.width && tile.y < self.height
    }

    /// Checks bounds, tile overlap and id uniqueness.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.width == 0 || self.height == 0 {
            return Err(LayoutError::EmptyGrid);
        }

        let mut occupied = HashSet::new();
        let mut ids = HashSet::new();

        for &tile in &self.roads {
            self.check_bounds(tile)?;
            // Duplicate road tiles are harmless
            occupied.insert(tile);
        }

        for placed in &self.buildings {
            self.check_bounds(placed.tile)?;
            if !occupied.insert(placed.tile) {
                return Err(LayoutError::Occupied { tile: placed.tile });
            }
            if !ids.insert(&placed.building.id) {
                return Err(LayoutError::DuplicateId(placed.building.id.clone()));
            }
        }

        Ok(())
    }

    fn check_bounds(&self, tile: Tile) -> Result<(), LayoutError> {
        if self.in_bounds(tile) {
            Ok(())
        } else {
            Err(LayoutError::OutOfBounds {
                tile,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Adds a straight horizontal road from `x0` to `x1` inclusive.
    pub fn road_row(&mut self, y: u32, x0: u32, x1: u32) -> &mut Self {
        for x in x0.min(x1)..=x0.max(x1) {
            self.roads.push(Tile::new(x, y));
        }
        self
    }

    /// Adds a straight vertical road from `y0` to `y1` inclusive.
    pub fn road_column(&mut self, x: u32, y0: u32, y1: u32) -> &mut Self {
        for y in y0.min(y1)..=y0.max(y1) {
            self.roads.push(Tile::new(x, y));
        }
        self
    }

    pub fn place(&mut self, building: Building, tile: Tile) -> &mut Self {
        self.buildings.push(PlacedBuilding::new(building, tile));
        self
    }

    pub fn building(&self, id: &BuildingId) -> Option<&PlacedBuilding> {
        self.buildings.iter().find(|p| &p.building.id == id)
    }
}
