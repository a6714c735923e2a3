//! Scenario Files
//!
//! A scenario is a starting layout plus edits that land at the start of a
//! given tick. Stored as JSON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use city_model::{Building, BuildingId, CityLayout, LayoutError, Tile};

use crate::city::City;
use crate::output::RunSummary;

/// Errors that can occur loading or running a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("edit at tick {tick} failed: {source}")]
    Edit { tick: u64, source: LayoutError },
}

/// A change to the city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Edit {
    PlaceBuilding { building: Building, tile: Tile },
    RemoveBuilding { id: BuildingId },
    PlaceRoad { tile: Tile },
    RemoveRoad { tile: Tile },
}

/// An edit and the tick it applies at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEdit {
    pub tick: u64,
    #[serde(flatten)]
    pub edit: Edit,
}

/// Starting layout, suggested run length and scheduled edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Run length used when the caller does not give one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticks: Option<u64>,
    pub layout: CityLayout,
    #[serde(default)]
    pub edits: Vec<TimedEdit>,
}

impl Scenario {
    /// A scenario with no edits
    pub fn from_layout(name: impl Into<String>, layout: CityLayout) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            ticks: None,
            layout,
            edits: Vec::new(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses and validates the starting layout.
    pub fn from_str(content: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(content)?;
        scenario.layout.validate()?;
        Ok(scenario)
    }

    pub fn to_json(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Edits scheduled for `tick`, in file order
    pub fn edits_at(&self, tick: u64) -> impl Iterator<Item = &Edit> {
        self.edits
            .iter()
            .filter(move |e| e.tick == tick)
            .map(|e| &e.edit)
    }

    /// Runs `ticks` ticks, applying each tick's edits before evaluating it.
    pub fn run(&self, city: &mut City, ticks: u64) -> Result<RunSummary, ScenarioError> {
        info!("Running scenario '{}' for {} ticks", self.name, ticks);

        for _ in 0..ticks {
            let tick = city.current_tick();
            for edit in self.edits_at(tick) {
                apply_edit(city, edit).map_err(|source| ScenarioError::Edit { tick, source })?;
            }
            city.tick();
        }

        Ok(city.summary())
    }
}

/// Applies one edit. Removing a missing road is only a warning.
pub fn apply_edit(city: &mut City, edit: &Edit) -> Result<(), LayoutError> {
    match edit {
        Edit::PlaceBuilding { building, tile } => city.place_building(building.clone(), *tile),
        Edit::RemoveBuilding { id } => city.remove_building(id).map(|_| ()),
        Edit::PlaceRoad { tile } => city.place_road(*tile),
        Edit::RemoveRoad { tile } => {
            if !city.remove_road(*tile) {
                warn!("No road at ({}, {}) to remove", tile.x, tile.y);
            }
            Ok(())
        }
    }
}
