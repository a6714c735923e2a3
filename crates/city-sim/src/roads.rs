//! Grid Road Network
//!
//! Road tiles on a bounded grid with 4-neighbour connectivity, plus the lot
//! each building stands on. Implements [`RoadGraph`] for the metrics engine.

use bevy_ecs::prelude::*;
use pathfinding::prelude::dijkstra_reach;
use std::collections::{BTreeSet, HashMap, HashSet};

use city_model::{Building, BuildingId, CityLayout, LayoutError, Tile};
use metrics_engine::RoadGraph;

/// Resource: the road grid and building lots.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct GridRoads {
    width: u32,
    height: u32,
    roads: BTreeSet<Tile>,
    lots: HashMap<BuildingId, Tile>,
}

impl GridRoads {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            roads: BTreeSet::new(),
            lots: HashMap::new(),
        }
    }

    /// Builds the network from a validated layout.
    pub fn from_layout(layout: &CityLayout) -> Result<Self, LayoutError> {
        layout.validate()?;
        let mut grid = Self::new(layout.width, layout.height);
        grid.roads.extend(layout.roads.iter().copied());
        for placed in &layout.buildings {
            grid.lots.insert(placed.building.id.clone(), placed.tile);
        }
        Ok(grid)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, tile: Tile) -> bool {
        tile.x < self.width && tile.y < self.height
    }

    pub fn is_road(&self, tile: Tile) -> bool {
        self.roads.contains(&tile)
    }

    /// Road tiles in `Tile` order.
    pub fn roads(&self) -> impl Iterator<Item = Tile> + '_ {
        self.roads.iter().copied()
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn lot(&self, id: &BuildingId) -> Option<Tile> {
        self.lots.get(id).copied()
    }

    /// True when a road or a building occupies `tile`.
    pub fn is_occupied(&self, tile: Tile) -> bool {
        self.is_road(tile) || self.lots.values().any(|t| *t == tile)
    }

    fn check_free(&self, tile: Tile) -> Result<(), LayoutError> {
        if !self.in_bounds(tile) {
            return Err(LayoutError::OutOfBounds {
                tile,
                width: self.width,
                height: self.height,
            });
        }
        if self.is_occupied(tile) {
            return Err(LayoutError::Occupied { tile });
        }
        Ok(())
    }

    /// Paves `tile`. Fails if it is out of bounds or already taken.
    pub fn place_road(&mut self, tile: Tile) -> Result<(), LayoutError> {
        self.check_free(tile)?;
        self.roads.insert(tile);
        Ok(())
    }

    /// Removes the road on `tile`. Returns false if there was none.
    pub fn remove_road(&mut self, tile: Tile) -> bool {
        self.roads.remove(&tile)
    }

    /// Reserves `tile` for building `id`.
    pub fn place_lot(&mut self, id: &BuildingId, tile: Tile) -> Result<(), LayoutError> {
        if self.lots.contains_key(id) {
            return Err(LayoutError::DuplicateId(id.clone()));
        }
        self.check_free(tile)?;
        self.lots.insert(id.clone(), tile);
        Ok(())
    }

    /// Frees the lot of building `id`.
    pub fn remove_lot(&mut self, id: &BuildingId) -> Result<Tile, LayoutError> {
        self.lots
            .remove(id)
            .ok_or_else(|| LayoutError::UnknownBuilding(id.clone()))
    }

    /// Road tiles 4-adjacent to the lot of `id`.
    fn entries(&self, id: &BuildingId) -> Vec<Tile> {
        match self.lots.get(id) {
            Some(lot) => lot.neighbors4().filter(|t| self.is_road(*t)).collect(),
            None => Vec::new(),
        }
    }
}

impl RoadGraph for GridRoads {
    type Adjacent = Tile;

    fn road_adjacents(&self, building: &Building) -> Vec<Tile> {
        self.entries(&building.id)
    }

    /// Road steps between the nearest entry tiles of `a` and `b`.
    ///
    /// Runs one Dijkstra from a virtual origin linked to every entry of `a`
    /// at cost 0. The reach iterator is lazy and yields nodes in cost order,
    /// so the search stops at the first node beyond `max_distance`.
    fn road_distance(&self, a: &Building, b: &Building, max_distance: f64) -> Option<f64> {
        if max_distance.is_nan() || max_distance < 0.0 {
            return None;
        }
        let limit = if max_distance >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            max_distance.floor() as u32
        };

        let starts = self.entries(&a.id);
        let goals: HashSet<Tile> = self.entries(&b.id).into_iter().collect();
        if starts.is_empty() || goals.is_empty() {
            return None;
        }

        let origin: Option<Tile> = None;
        dijkstra_reach(&origin, |node: &Option<Tile>| match node {
            None => starts.iter().map(|t| (Some(*t), 0u32)).collect::<Vec<_>>(),
            Some(tile) => tile
                .neighbors4()
                .filter(|n| self.is_road(*n))
                .map(|n| (Some(n), 1u32))
                .collect(),
        })
        .take_while(|item| item.total_cost <= limit)
        .find_map(|item| match item.node {
            Some(tile) if goals.contains(&tile) => Some(f64::from(item.total_cost)),
            _ => None,
        })
    }
}
