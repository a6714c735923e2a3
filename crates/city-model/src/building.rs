//! Building Types
//!
//! Identity, kind, category and editor metadata for placed buildings.
//!
//! Position and road adjacency are not stored here: they belong to whatever
//! road network the building is placed on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Generates a building ID with the given sequence number.
///
/// Zero padding keeps lexical order equal to sequence order.
pub fn generate_building_id(sequence: u64) -> BuildingId {
    BuildingId(format!("bld_{:05}", sequence))
}

/// Stable, unique identity of a building.
///
/// Ordering is the canonical iteration order everywhere metrics are summed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingId(pub String);

impl BuildingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BuildingId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for BuildingId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Error for an unrecognised building type or category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{name}'")]
pub struct ParseKindError {
    pub kind: &'static str,
    pub name: String,
}

/// The specific kind of a building.
///
/// Serialized as a snake_case string so it can key TOML and JSON maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BuildingType {
    House,
    Office,
    Factory,
    Hospital,
    Mall,
    School,
    Park,
}

impl BuildingType {
    pub const ALL: [BuildingType; 7] = [
        BuildingType::House,
        BuildingType::Office,
        BuildingType::Factory,
        BuildingType::Hospital,
        BuildingType::Mall,
        BuildingType::School,
        BuildingType::Park,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildingType::House => "house",
            BuildingType::Office => "office",
            BuildingType::Factory => "factory",
            BuildingType::Hospital => "hospital",
            BuildingType::Mall => "mall",
            BuildingType::School => "school",
            BuildingType::Park => "park",
        }
    }

    /// Built-in classification used when a coefficient file does not
    /// override it. Covers every type, so classification is always total.
    pub fn default_category(&self) -> Category {
        match self {
            BuildingType::House => Category::Residential,
            BuildingType::Office => Category::Commercial,
            BuildingType::Factory => Category::Industrial,
            BuildingType::Hospital => Category::Health,
            BuildingType::Mall => Category::Retail,
            BuildingType::School => Category::Education,
            BuildingType::Park => Category::Leisure,
        }
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildingType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildingType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseKindError {
                kind: "building type",
                name: s.to_string(),
            })
    }
}

impl TryFrom<String> for BuildingType {
    type Error = ParseKindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BuildingType> for String {
    fn from(value: BuildingType) -> Self {
        value.as_str().to_string()
    }
}

/// Coarse classification used only to index contribution tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Residential,
    Commercial,
    Retail,
    Industrial,
    Health,
    Education,
    Leisure,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Residential,
        Category::Commercial,
        Category::Retail,
        Category::Industrial,
        Category::Health,
        Category::Education,
        Category::Leisure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Residential => "residential",
            Category::Commercial => "commercial",
            Category::Retail => "retail",
            Category::Industrial => "industrial",
            Category::Health => "health",
            Category::Education => "education",
            Category::Leisure => "leisure",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseKindError {
                kind: "category",
                name: s.to_string(),
            })
    }
}

impl TryFrom<String> for Category {
    type Error = ParseKindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

/// A to-do item attached to a building by the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            done: false,
        }
    }
}

/// Free-form editor metadata. Never read by the metrics engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<Task>,
}

impl BuildingMeta {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.description.is_empty() && self.tasks.is_empty()
    }

    /// Adds a task, ignoring blank text. Returns the new task's id.
    pub fn add_task(&mut self, text: &str) -> Option<Uuid> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let task = Task::new(text);
        let id = task.id;
        self.tasks.push(task);
        Some(id)
    }

    pub fn remove_task(&mut self, id: Uuid) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }
}

/// A placed building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    #[serde(rename = "type")]
    pub building_type: BuildingType,
    /// Road-connected this tick. Recomputed before every evaluation.
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "BuildingMeta::is_empty")]
    pub meta: BuildingMeta,
}

impl Building {
    pub fn new(id: impl Into<BuildingId>, building_type: BuildingType) -> Self {
        Self {
            id: id.into(),
            building_type,
            active: false,
            meta: BuildingMeta::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.meta.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.meta.description = description.into();
        self
    }

    pub fn is_house(&self) -> bool {
        self.building_type == BuildingType::House
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_sort_by_sequence() {
        let a = generate_building_id(9);
        let b = generate_building_id(10);
        assert_eq!(a.as_str(), "bld_00009");
        assert!(a < b);
    }

    #[test]
    fn test_building_type_serialization() {
        assert_eq!(
            serde_json::to_string(&BuildingType::Factory).unwrap(),
            r#""factory""#
        );
        let parsed: BuildingType = serde_json::from_str(r#""hospital""#).unwrap();
        assert_eq!(parsed, BuildingType::Hospital);
    }

    #[test]
    fn test_unknown_building_type_rejected() {
        let err = "castle".parse::<BuildingType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown building type 'castle'");
        assert!(serde_json::from_str::<BuildingType>(r#""castle""#).is_err());
    }

    #[test]
    fn test_default_classification_is_total() {
        for building_type in BuildingType::ALL {
            // Every type maps to some category
            let category = building_type.default_category();
            assert!(Category::ALL.contains(&category));
        }
        assert_eq!(BuildingType::House.default_category(), Category::Residential);
    }

    #[test]
    fn test_category_keys_in_json_map() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(Category::Industrial, 1.0);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"industrial":1.0}"#);
    }

    #[test]
    fn test_building_json_uses_type_field() {
        let json = r#"{"id":"bld_00001","type":"house"}"#;
        let building: Building = serde_json::from_str(json).unwrap();
        assert_eq!(building.id, BuildingId::from("bld_00001"));
        assert!(building.is_house());
        assert!(!building.active);
        assert!(building.meta.is_empty());
    }

    #[test]
    fn test_meta_omitted_when_empty() {
        let building = Building::new("bld_00002", BuildingType::Park);
        let json = serde_json::to_string(&building).unwrap();
        assert!(!json.contains("meta"));

        let named = building.with_name("Riverside");
        let json = serde_json::to_string(&named).unwrap();
        assert!(json.contains("Riverside"));
    }

    #[test]
    fn test_task_editing() {
        let mut meta = BuildingMeta::default();
        assert_eq!(meta.add_task("   "), None);

        let id = meta.add_task(" hire staff ").unwrap();
        assert_eq!(meta.tasks.len(), 1);
        assert_eq!(meta.tasks[0].text, "hire staff");
        assert!(!meta.tasks[0].done);

        assert!(meta.remove_task(id));
        assert!(!meta.remove_task(id));
        assert!(meta.is_empty());
    }
}
