//! Activity resolution.
//!
//! A building takes part in the metrics only while it touches the road
//! network. The flag is rewritten on every call and read-only afterwards.

use city_model::Building;

use crate::road::RoadGraph;

/// Recomputes `active` for every building. Returns the active count.
///
/// Idempotent for an unchanged road graph.
pub fn resolve_activity<R: RoadGraph>(buildings: &mut [Building], roads: &R) -> usize {
    let mut active = 0;
    for building in buildings.iter_mut() {
        building.active = !roads.road_adjacents(building).is_empty();
        if building.active {
            active += 1;
        }
    }
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use city_model::{BuildingId, BuildingType};
    use std::collections::HashSet;

    struct Connected(HashSet<BuildingId>);

    impl RoadGraph for Connected {
        type Adjacent = ();

        fn road_adjacents(&self, building: &Building) -> Vec<()> {
            if self.0.contains(&building.id) {
                vec![()]
            } else {
                Vec::new()
            }
        }

        fn road_distance(&self, _a: &Building, _b: &Building, _max: f64) -> Option<f64> {
            None
        }
    }

    #[test]
    fn test_flags_follow_adjacency() {
        let roads = Connected([BuildingId::from("b")].into_iter().collect());
        let mut buildings = vec![
            Building::new("a", BuildingType::House),
            Building::new("b", BuildingType::Office),
        ];

        let active = resolve_activity(&mut buildings, &roads);

        assert_eq!(active, 1);
        assert!(!buildings[0].active);
        assert!(buildings[1].active);
    }

    #[test]
    fn test_stale_flag_is_overwritten() {
        let roads = Connected(HashSet::new());
        let mut buildings = vec![Building::new("a", BuildingType::House)];
        buildings[0].active = true;

        resolve_activity(&mut buildings, &roads);

        assert!(!buildings[0].active);
    }

    #[test]
    fn test_idempotent() {
        let roads = Connected([BuildingId::from("a")].into_iter().collect());
        let mut buildings = vec![
            Building::new("a", BuildingType::House),
            Building::new("b", BuildingType::Park),
        ];

        resolve_activity(&mut buildings, &roads);
        let first: Vec<bool> = buildings.iter().map(|b| b.active).collect();
        resolve_activity(&mut buildings, &roads);
        let second: Vec<bool> = buildings.iter().map(|b| b.active).collect();

        assert_eq!(first, second);
    }
}
