//! Accessibility primitives over an influence table.
//!
//! These are not part of the aggregate. They answer per-building questions
//! such as how much leisure sits near a workplace, and are recomputed on
//! every call.

use std::collections::BTreeMap;

use city_model::{Building, BuildingId, BuildingType, POPULATION_PER_HOUSE};

use crate::influence::InfluenceTable;

/// Road distance at which the closeness ramp reaches zero.
pub const NEAR_PENALTY_RANGE: f64 = 8.0;

/// Types counted as leisure amenities for a workplace.
pub const LEISURE_TYPES: [BuildingType; 3] =
    [BuildingType::Park, BuildingType::Mall, BuildingType::Hospital];

/// Leisure influence that maps to a bonus of 1.0 before capping.
pub const LEISURE_SCALE: f64 = 2.2;

/// Largest leisure bonus (+35%).
pub const LEISURE_CAP: f64 = 0.35;

/// Read-only view joining active buildings with their influence links.
pub struct Accessibility<'a> {
    active: BTreeMap<&'a BuildingId, &'a Building>,
    table: &'a InfluenceTable,
}

impl<'a> Accessibility<'a> {
    pub fn new(buildings: &'a [Building], table: &'a InfluenceTable) -> Self {
        let active = buildings
            .iter()
            .filter(|b| b.active)
            .map(|b| (&b.id, b))
            .collect();
        Self { active, table }
    }

    fn is_active(&self, id: &BuildingId) -> bool {
        self.active.contains_key(id)
    }

    /// Active linked sources of `target` whose type is in `types`, with
    /// their distance and weight.
    fn sources<'s>(
        &'s self,
        target: &'s BuildingId,
        types: &'s [BuildingType],
    ) -> impl Iterator<Item = (f64, f64)> + 's {
        let linked = if self.is_active(target) {
            Some(self.table.links_of(target))
        } else {
            None
        };
        linked.into_iter().flatten().filter_map(move |(other, entry)| {
            let source = self.active.get(other)?;
            types
                .contains(&source.building_type)
                .then_some((entry.distance, entry.weight))
        })
    }

    /// Sum of influence weights reaching `target` from buildings of `types`.
    pub fn influence_to(&self, target: &BuildingId, types: &[BuildingType]) -> f64 {
        self.sources(target, types).map(|(_, weight)| weight).sum()
    }

    /// Like [`influence_to`](Self::influence_to), with each weight scaled by
    /// a linear ramp that is 1 at distance 0 and 0 from
    /// [`NEAR_PENALTY_RANGE`] on.
    pub fn nearest_penalty(&self, target: &BuildingId, types: &[BuildingType]) -> f64 {
        self.sources(target, types)
            .map(|(distance, weight)| {
                let ramp = ((NEAR_PENALTY_RANGE - distance) / NEAR_PENALTY_RANGE).max(0.0);
                weight * ramp
            })
            .sum()
    }

    /// Effective workers reachable from active houses.
    pub fn worker_access(&self, work: &BuildingId) -> f64 {
        self.sources(work, &[BuildingType::House])
            .map(|(_, weight)| f64::from(POPULATION_PER_HOUSE) * weight)
            .sum()
    }

    /// Saturating attractiveness boost from nearby leisure, in `[0, 0.35]`.
    pub fn leisure_bonus(&self, work: &BuildingId) -> f64 {
        (self.influence_to(work, &LEISURE_TYPES) / LEISURE_SCALE)
            .max(0.0)
            .min(LEISURE_CAP)
    }
}
