//! Road graph interface.
//!
//! The engine never owns positions or road state. It asks the host's road
//! network two questions per tick through this trait.

use city_model::Building;

/// Read view of the road network for one evaluation.
pub trait RoadGraph {
    /// Whatever the network considers adjacent to a building (road tiles,
    /// nodes, segments). Only the count matters to the engine.
    type Adjacent;

    /// Road-adjacent entities of `building`. Empty means not connected.
    fn road_adjacents(&self, building: &Building) -> Vec<Self::Adjacent>;

    /// Shortest road distance from `a` to `b`, searching no farther than
    /// `max_distance`. `None` when no path exists within the cutoff.
    ///
    /// Must return the same value for the same graph state.
    fn road_distance(&self, a: &Building, b: &Building, max_distance: f64) -> Option<f64>;
}
