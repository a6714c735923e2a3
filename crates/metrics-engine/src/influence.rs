//! Pairwise influence table.
//!
//! For every pair of active buildings the road distance is turned into an
//! exponentially decaying weight. Pairs with no path inside the cutoff, or
//! whose weight falls below the threshold, are left out entirely.

use std::collections::BTreeMap;

use city_model::{Building, BuildingId};
use tracing::{trace, warn};

use crate::coefficients::Globals;
use crate::road::RoadGraph;

/// Influence weight at road distance `distance`: `exp(-distance / lambda)`.
///
/// Equals 1 at distance 0 and decays toward 0; a larger `lambda` reaches
/// farther.
pub fn exponential_falloff(distance: f64, lambda: f64) -> f64 {
    (-distance / lambda).exp()
}

/// Unordered building pair, stored with the smaller id first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    low: BuildingId,
    high: BuildingId,
}

impl PairKey {
    pub fn new(a: &BuildingId, b: &BuildingId) -> Self {
        if a <= b {
            Self {
                low: a.clone(),
                high: b.clone(),
            }
        } else {
            Self {
                low: b.clone(),
                high: a.clone(),
            }
        }
    }

    pub fn low(&self) -> &BuildingId {
        &self.low
    }

    pub fn high(&self) -> &BuildingId {
        &self.high
    }

    pub fn contains(&self, id: &BuildingId) -> bool {
        &self.low == id || &self.high == id
    }

    /// The member that is not `id`, if `id` is a member.
    pub fn other(&self, id: &BuildingId) -> Option<&BuildingId> {
        if &self.low == id {
            Some(&self.high)
        } else if &self.high == id {
            Some(&self.low)
        } else {
            None
        }
    }
}

/// Road distance and influence weight of one retained pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfluenceEntry {
    pub distance: f64,
    pub weight: f64,
}

/// All retained pairs for one tick, iterated in canonical key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfluenceTable {
    entries: BTreeMap<PairKey, InfluenceEntry>,
}

impl InfluenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table over the active buildings in `buildings`.
    ///
    /// Buildings are visited in id order so repeated builds query the road
    /// graph identically.
    pub fn build<R: RoadGraph>(buildings: &[Building], roads: &R, globals: &Globals) -> Self {
        let mut active: Vec<&Building> = buildings.iter().filter(|b| b.active).collect();
        active.sort_by(|a, b| a.id.cmp(&b.id));

        let mut table = Self::new();

        for (i, a) in active.iter().enumerate() {
            for b in &active[i + 1..] {
                if a.id == b.id {
                    continue;
                }

                let Some(distance) = roads.road_distance(a, b, globals.d_max) else {
                    continue;
                };
                if !distance.is_finite() || distance < 0.0 {
                    warn!(
                        "Discarding pair {}-{}: road distance {} is not usable",
                        a.id, b.id, distance
                    );
                    continue;
                }
                if distance > globals.d_max {
                    continue;
                }

                let weight = exponential_falloff(distance, globals.lambda);
                if !weight.is_finite() {
                    warn!(
                        "Discarding pair {}-{}: weight {} is not finite",
                        a.id, b.id, weight
                    );
                    continue;
                }
                if weight < globals.theta {
                    trace!(
                        "Pruned pair {}-{}: weight {:.4} below threshold {}",
                        a.id,
                        b.id,
                        weight,
                        globals.theta
                    );
                    continue;
                }

                table.insert(&a.id, &b.id, InfluenceEntry { distance, weight });
            }
        }

        table
    }

    /// Inserts or replaces the entry for the unordered pair.
    pub fn insert(&mut self, a: &BuildingId, b: &BuildingId, entry: InfluenceEntry) {
        self.entries.insert(PairKey::new(a, b), entry);
    }

    /// Looks up a pair from either direction. A building has no self pair.
    pub fn get(&self, a: &BuildingId, b: &BuildingId) -> Option<&InfluenceEntry> {
        if a == b {
            return None;
        }
        self.entries.get(&PairKey::new(a, b))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &InfluenceEntry)> {
        self.entries.iter()
    }

    /// Entries involving `id`, paired with the other member's id.
    pub fn links_of<'a>(
        &'a self,
        id: &'a BuildingId,
    ) -> impl Iterator<Item = (&'a BuildingId, &'a InfluenceEntry)> + 'a {
        self.entries
            .iter()
            .filter_map(move |(key, entry)| key.other(id).map(|other| (other, entry)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
