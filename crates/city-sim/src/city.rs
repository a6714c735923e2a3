//! City World
//!
//! Buildings live as ECS entities; the road grid, the engine and the run
//! bookkeeping are resources. One schedule run evaluates one tick.

use bevy_ecs::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, error, info};

use city_model::{Building, BuildingId, CityLayout, LayoutError, MetricsSnapshot, PlacedBuilding, Tile};
use metrics_engine::{Evaluation, MetricsEngine};

use crate::inspect::{inspect, BuildingReport};
use crate::output::{MetricsLogger, OutputError, RunSummary, StatsCollector, TickMetrics};
use crate::roads::GridRoads;

/// Component: the building standing on this entity's lot
#[derive(Component, Debug, Clone)]
pub struct Structure(pub Building);

/// Component: the tile a building occupies
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lot(pub Tile);

/// Resource: the metrics engine used every tick
#[derive(Resource)]
pub struct Engine(pub MetricsEngine);

/// Resource: building id → entity
#[derive(Resource, Debug, Default)]
pub struct BuildingIndex {
    by_id: BTreeMap<BuildingId, Entity>,
}

impl BuildingIndex {
    pub fn get(&self, id: &BuildingId) -> Option<Entity> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Resource: the tick currently being evaluated
#[derive(Resource, Debug, Default)]
pub struct CityClock {
    pub tick: u64,
}

/// Resource: result of the most recent evaluation
#[derive(Resource, Debug, Default)]
pub struct LatestMetrics {
    /// Buildings as they were evaluated, sorted by id
    pub buildings: Vec<Building>,
    pub evaluation: Option<Evaluation>,
}

/// System: evaluate the city and write `active` back to each structure
pub fn evaluate_metrics(
    mut structures: Query<(Entity, &mut Structure)>,
    roads: Res<GridRoads>,
    engine: Res<Engine>,
    mut latest: ResMut<LatestMetrics>,
) {
    let mut entries: Vec<(Entity, Building)> = structures
        .iter()
        .map(|(entity, structure)| (entity, structure.0.clone()))
        .collect();
    entries.sort_by(|a, b| a.1.id.cmp(&b.1.id));

    let (entities, mut buildings): (Vec<Entity>, Vec<Building>) = entries.into_iter().unzip();
    let evaluation = engine.0.evaluate(&mut buildings, &*roads);

    for (entity, building) in entities.iter().zip(&buildings) {
        if let Ok((_, mut structure)) = structures.get_mut(*entity) {
            structure.0.active = building.active;
        }
    }

    latest.buildings = buildings;
    latest.evaluation = Some(evaluation);
}

/// System: log the latest evaluation and fold it into the run statistics
pub fn record_metrics(
    clock: Res<CityClock>,
    latest: Res<LatestMetrics>,
    mut logger: ResMut<MetricsLogger>,
    mut stats: ResMut<StatsCollector>,
) {
    let Some(evaluation) = &latest.evaluation else {
        return;
    };

    let line = TickMetrics {
        tick: clock.tick,
        snapshot: evaluation.snapshot,
        active_buildings: evaluation.active_count,
        influence_pairs: evaluation.table.len(),
    };
    if let Err(e) = logger.log(&line) {
        error!("Failed to log metrics for tick {}: {}", clock.tick, e);
    }
    stats.record_tick(&evaluation.snapshot);

    debug!("[Tick {:>4}] {}", clock.tick, evaluation.snapshot);
}

/// The ECS world and its per-tick schedule
pub struct City {
    world: World,
    schedule: Schedule,
}

impl City {
    /// Creates a city from a layout. Logs to nowhere until
    /// [`with_logger`](Self::with_logger) is called.
    pub fn new(layout: &CityLayout, engine: MetricsEngine) -> Result<Self, LayoutError> {
        let roads = GridRoads::from_layout(layout)?;

        let mut world = World::new();
        world.insert_resource(roads);
        world.insert_resource(Engine(engine));
        world.insert_resource(BuildingIndex::default());
        world.insert_resource(CityClock::default());
        world.insert_resource(LatestMetrics::default());
        world.insert_resource(MetricsLogger::null());
        world.insert_resource(StatsCollector::new());

        for placed in &layout.buildings {
            spawn_structure(&mut world, placed.building.clone(), placed.tile);
        }

        let mut schedule = Schedule::default();
        schedule.add_systems((evaluate_metrics, record_metrics).chain());

        info!(
            "City ready: {}x{} grid, {} road tiles, {} buildings",
            layout.width,
            layout.height,
            layout.roads.len(),
            layout.buildings.len()
        );

        Ok(Self { world, schedule })
    }

    /// Replaces the metrics log sink
    pub fn with_logger(mut self, logger: MetricsLogger) -> Self {
        self.world.insert_resource(logger);
        self
    }

    /// The tick the next call to [`tick`](Self::tick) evaluates
    pub fn current_tick(&self) -> u64 {
        self.world.resource::<CityClock>().tick
    }

    /// Evaluates the current tick, then advances the clock.
    pub fn tick(&mut self) -> MetricsSnapshot {
        self.schedule.run(&mut self.world);

        let snapshot = self.snapshot().unwrap_or_default();
        self.world.resource_mut::<CityClock>().tick += 1;
        snapshot
    }

    /// Snapshot from the most recent tick
    pub fn snapshot(&self) -> Option<MetricsSnapshot> {
        self.world
            .resource::<LatestMetrics>()
            .evaluation
            .as_ref()
            .map(|e| e.snapshot)
    }

    pub fn roads(&self) -> &GridRoads {
        self.world.resource::<GridRoads>()
    }

    pub fn engine(&self) -> &MetricsEngine {
        &self.world.resource::<Engine>().0
    }

    pub fn building_count(&self) -> usize {
        self.world.resource::<BuildingIndex>().len()
    }

    pub fn building(&self, id: &BuildingId) -> Option<&Building> {
        let entity = self.world.resource::<BuildingIndex>().get(id)?;
        self.world.get::<Structure>(entity).map(|s| &s.0)
    }

    /// Current buildings with their lots, sorted by id
    pub fn placed_buildings(&self) -> Vec<PlacedBuilding> {
        let index = self.world.resource::<BuildingIndex>();
        index
            .by_id
            .values()
            .filter_map(|entity| {
                let structure = self.world.get::<Structure>(*entity)?;
                let lot = self.world.get::<Lot>(*entity)?;
                Some(PlacedBuilding::new(structure.0.clone(), lot.0))
            })
            .collect()
    }

    /// The current city as a layout
    pub fn layout(&self) -> CityLayout {
        let roads = self.roads();
        let mut layout = CityLayout::new(roads.width(), roads.height());
        layout.roads = roads.roads().collect();
        layout.buildings = self.placed_buildings();
        layout
    }

    /// Places a building on a free tile. Takes effect on the next tick.
    pub fn place_building(&mut self, building: Building, tile: Tile) -> Result<(), LayoutError> {
        self.world
            .resource_mut::<GridRoads>()
            .place_lot(&building.id, tile)?;
        debug!("Placed {} {} at ({}, {})", building.building_type, building.id, tile.x, tile.y);
        spawn_structure(&mut self.world, building, tile);
        Ok(())
    }

    /// Removes a building and frees its lot.
    pub fn remove_building(&mut self, id: &BuildingId) -> Result<Building, LayoutError> {
        let entity = self
            .world
            .resource::<BuildingIndex>()
            .get(id)
            .ok_or_else(|| LayoutError::UnknownBuilding(id.clone()))?;

        self.world.resource_mut::<GridRoads>().remove_lot(id)?;
        self.world.resource_mut::<BuildingIndex>().by_id.remove(id);

        let building = self.world.get::<Structure>(entity).map(|s| s.0.clone());
        self.world.despawn(entity);
        debug!("Removed {}", id);

        building.ok_or_else(|| LayoutError::UnknownBuilding(id.clone()))
    }

    pub fn place_road(&mut self, tile: Tile) -> Result<(), LayoutError> {
        self.world.resource_mut::<GridRoads>().place_road(tile)
    }

    /// Returns false if `tile` held no road.
    pub fn remove_road(&mut self, tile: Tile) -> bool {
        self.world.resource_mut::<GridRoads>().remove_road(tile)
    }

    /// Per-building accessibility for the most recent tick
    pub fn inspect(&self) -> Vec<BuildingReport> {
        let latest = self.world.resource::<LatestMetrics>();
        match &latest.evaluation {
            Some(evaluation) => inspect(
                &latest.buildings,
                evaluation,
                self.engine().provider(),
                self.roads(),
            ),
            None => Vec::new(),
        }
    }

    pub fn summary(&self) -> RunSummary {
        self.world.resource::<StatsCollector>().summary()
    }

    /// Flushes the metrics log
    pub fn flush_log(&mut self) -> Result<(), OutputError> {
        self.world.resource_mut::<MetricsLogger>().flush()
    }
}

fn spawn_structure(world: &mut World, building: Building, tile: Tile) {
    let id = building.id.clone();
    let entity = world.spawn((Structure(building), Lot(tile))).id();
    world.resource_mut::<BuildingIndex>().by_id.insert(id, entity);
}
