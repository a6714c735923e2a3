//! End-to-end evaluation tests with in-memory road graphs.

use std::collections::{HashMap, HashSet};

use city_model::fixtures;
use city_model::{Building, BuildingId, BuildingType, CityLayout, Category, Metric, Tile};
use metrics_engine::{
    BaseContribution, CoefficientSet, InfluenceTable, MetricsEngine, RoadGraph,
};

/// Road graph given as a set of connected buildings and explicit distances.
#[derive(Default)]
struct TableRoads {
    connected: HashSet<BuildingId>,
    distances: HashMap<(BuildingId, BuildingId), f64>,
}

impl TableRoads {
    fn connect(mut self, id: &str) -> Self {
        self.connected.insert(id.into());
        self
    }

    fn distance(mut self, a: &str, b: &str, d: f64) -> Self {
        self.distances.insert((a.into(), b.into()), d);
        self.distances.insert((b.into(), a.into()), d);
        self
    }
}

impl RoadGraph for TableRoads {
    type Adjacent = BuildingId;

    fn road_adjacents(&self, building: &Building) -> Vec<BuildingId> {
        if self.connected.contains(&building.id) {
            vec![building.id.clone()]
        } else {
            Vec::new()
        }
    }

    fn road_distance(&self, a: &Building, b: &Building, max: f64) -> Option<f64> {
        self.distances
            .get(&(a.id.clone(), b.id.clone()))
            .copied()
            .filter(|d| *d <= max)
    }
}

/// Road graph over a layout where every building is reached by walking the
/// straight line between tiles. Good enough for single-road fixtures.
struct StraightRoads {
    tiles: HashMap<BuildingId, Tile>,
    roads: HashSet<Tile>,
}

impl StraightRoads {
    fn new(layout: &CityLayout) -> Self {
        Self {
            tiles: layout
                .buildings
                .iter()
                .map(|p| (p.building.id.clone(), p.tile))
                .collect(),
            roads: layout.roads.iter().copied().collect(),
        }
    }
}

impl RoadGraph for StraightRoads {
    type Adjacent = Tile;

    fn road_adjacents(&self, building: &Building) -> Vec<Tile> {
        match self.tiles.get(&building.id) {
            Some(tile) => tile.neighbors4().filter(|t| self.roads.contains(t)).collect(),
            None => Vec::new(),
        }
    }

    fn road_distance(&self, a: &Building, b: &Building, max: f64) -> Option<f64> {
        let ta = self.tiles.get(&a.id)?;
        let tb = self.tiles.get(&b.id)?;
        let d = f64::from(ta.x.abs_diff(tb.x) + ta.y.abs_diff(tb.y));
        (d <= max).then_some(d)
    }
}

fn buildings_of(layout: &CityLayout) -> Vec<Building> {
    layout.buildings.iter().map(|p| p.building.clone()).collect()
}

/// Only the factory's base income and the factory → house income entry.
fn factory_income_model(lambda: f64) -> CoefficientSet {
    let mut model = CoefficientSet::empty();
    model.globals.lambda = lambda;
    model
        .base
        .insert(Category::Industrial, BaseContribution::new(5.0, 0.0, 0.0));
    model
        .pairwise
        .set(Metric::Income, Category::Industrial, Category::Residential, -1.0);
    model
}

#[test]
fn test_house_factory_example() {
    // weight(3) = 0.5
    let lambda = 3.0 / std::f64::consts::LN_2;
    let engine = MetricsEngine::new(factory_income_model(lambda)).unwrap();
    let roads = TableRoads::default()
        .connect("house")
        .connect("factory")
        .distance("house", "factory", 3.0);
    let mut buildings = vec![
        Building::new("house", BuildingType::House),
        Building::new("factory", BuildingType::Factory),
    ];

    let evaluation = engine.evaluate(&mut buildings, &roads);

    let entry = evaluation.table.get(&"house".into(), &"factory".into()).unwrap();
    assert!((entry.weight - 0.5).abs() < 1e-12);
    assert!((evaluation.snapshot.income - 4.5).abs() < 1e-12);
    assert_eq!(evaluation.snapshot.population, 10);
}

#[test]
fn test_house_factory_fixture_layout() {
    let lambda = 3.0 / std::f64::consts::LN_2;
    let engine = MetricsEngine::new(factory_income_model(lambda)).unwrap();
    let layout = fixtures::house_and_factory(3);
    let roads = StraightRoads::new(&layout);
    let mut buildings = buildings_of(&layout);

    let evaluation = engine.evaluate(&mut buildings, &roads);

    assert_eq!(evaluation.active_count, 2);
    assert!((evaluation.snapshot.income - 4.5).abs() < 1e-12);
}

#[test]
fn test_inactive_house_equals_removal() {
    let engine = MetricsEngine::with_defaults();
    let roads = TableRoads::default()
        .connect("a")
        .connect("b")
        .connect("c")
        .distance("a", "b", 2.0)
        .distance("a", "c", 4.0)
        .distance("b", "c", 3.0)
        .distance("a", "x", 1.0);

    let mut with_stray = vec![
        Building::new("a", BuildingType::House),
        Building::new("b", BuildingType::Park),
        Building::new("c", BuildingType::Office),
        Building::new("x", BuildingType::House),
    ];
    let mut without = vec![
        Building::new("a", BuildingType::House),
        Building::new("b", BuildingType::Park),
        Building::new("c", BuildingType::Office),
    ];

    let left = engine.evaluate(&mut with_stray, &roads);
    let right = engine.evaluate(&mut without, &roads);

    assert!(!with_stray[3].active);
    assert!(left.snapshot.bit_identical(&right.snapshot));
    assert_eq!(left.table, right.table);
    assert_eq!(left.snapshot.population, 10);
}

#[test]
fn test_isolated_building_contributes_only_base() {
    let engine = MetricsEngine::with_defaults();
    let model = engine.provider().clone();
    let roads = TableRoads::default()
        .connect("h1")
        .connect("h2")
        .connect("park")
        .distance("h1", "park", 1.0);

    let mut buildings = vec![
        Building::new("h1", BuildingType::House),
        Building::new("park", BuildingType::Park),
    ];
    let before = engine.evaluate(&mut buildings, &roads).snapshot;

    buildings.push(Building::new("h2", BuildingType::House));
    let after = engine.evaluate(&mut buildings, &roads).snapshot;

    let base = model.base_for(Category::Residential);
    assert_eq!(after.income, before.income + base.income);
    assert_eq!(after.population, before.population + 10);
}

#[test]
fn test_pair_beyond_cutoff_has_no_effect() {
    let mut model = CoefficientSet::default();
    model.globals.d_max = 5.0;
    let engine = MetricsEngine::new(model).unwrap();
    let roads = TableRoads::default()
        .connect("h")
        .connect("f")
        .distance("h", "f", 6.0);
    let mut buildings = vec![
        Building::new("h", BuildingType::House),
        Building::new("f", BuildingType::Factory),
    ];

    let evaluation = engine.evaluate(&mut buildings, &roads);

    assert!(evaluation.table.is_empty());
    assert_eq!(evaluation.active_count, 2);
}

#[test]
fn test_factory_hurts_happiness_more_up_close() {
    let engine = MetricsEngine::with_defaults();
    let happiness_at = |gap: u32| {
        let layout = fixtures::house_and_factory(gap);
        let roads = StraightRoads::new(&layout);
        let mut buildings = buildings_of(&layout);
        engine.evaluate(&mut buildings, &roads).snapshot.happiness
    };

    assert!(happiness_at(1) < happiness_at(6));
    assert!(happiness_at(6) < happiness_at(20));
}

#[test]
fn test_sample_layout_off_road_house() {
    let engine = MetricsEngine::with_defaults();
    let layout = fixtures::sample_layout();
    let roads = StraightRoads::new(&layout);
    let mut buildings = buildings_of(&layout);

    let evaluation = engine.evaluate(&mut buildings, &roads);

    let stray = buildings
        .iter()
        .find(|b| b.id == fixtures::disconnected_house_id())
        .unwrap();
    assert!(!stray.active);
    assert_eq!(evaluation.active_count, buildings.len() - 1);
    assert_eq!(evaluation.snapshot.population, 20);
    assert!(evaluation
        .table
        .iter()
        .all(|(key, _)| !key.contains(&fixtures::disconnected_house_id())));
}

#[test]
fn test_repeated_evaluation_is_bit_identical() {
    let engine = MetricsEngine::with_defaults();
    let layout = fixtures::sample_layout();
    let roads = StraightRoads::new(&layout);
    let mut buildings = buildings_of(&layout);

    let first = engine.evaluate(&mut buildings, &roads);
    let second = engine.evaluate(&mut buildings, &roads);

    assert!(first.snapshot.bit_identical(&second.snapshot));
    assert_eq!(first.table, second.table);
}

#[test]
fn test_empty_city() {
    let engine = MetricsEngine::with_defaults();
    let evaluation = engine.evaluate(&mut [], &TableRoads::default());

    assert_eq!(evaluation.active_count, 0);
    assert_eq!(evaluation.table, InfluenceTable::new());
    assert_eq!(evaluation.snapshot.population, 0);
}
