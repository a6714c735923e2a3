//! Scenario runs end to end: file in, metrics log and summary out.

use city_model::{fixtures, Building, BuildingType, Tile};
use city_sim::{
    read_metrics_log, write_summary, City, Edit, MetricsLogger, RunSummary, Scenario, TimedEdit,
};
use metrics_engine::{CoefficientSet, MetricsEngine};

fn sample_scenario() -> Scenario {
    let mut scenario = Scenario::from_layout("sample", fixtures::sample_layout());
    scenario.ticks = Some(6);
    scenario.edits = vec![
        // Connect the stray house
        TimedEdit {
            tick: 2,
            edit: Edit::PlaceRoad { tile: Tile::new(14, 13) },
        },
        TimedEdit {
            tick: 3,
            edit: Edit::PlaceBuilding {
                building: Building::new("bld_00009", BuildingType::School),
                tile: Tile::new(5, 4),
            },
        },
        TimedEdit {
            tick: 4,
            edit: Edit::RemoveBuilding { id: "bld_00004".into() },
        },
    ];
    scenario
}

#[test]
fn test_scenario_file_run() {
    let dir = tempfile::tempdir().unwrap();
    let scenario_path = dir.path().join("sample.json");
    let log_path = dir.path().join("metrics.jsonl");
    let summary_path = dir.path().join("summary.json");
    std::fs::write(&scenario_path, sample_scenario().to_json().unwrap()).unwrap();

    let scenario = Scenario::from_file(&scenario_path).unwrap();
    let mut city = City::new(&scenario.layout, MetricsEngine::with_defaults())
        .unwrap()
        .with_logger(MetricsLogger::new(&log_path).unwrap());
    let summary = scenario.run(&mut city, scenario.ticks.unwrap()).unwrap();
    city.flush_log().unwrap();
    write_summary(&summary, &summary_path).unwrap();

    let lines = read_metrics_log(&log_path).unwrap();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines.iter().map(|l| l.tick).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);

    // Stray house joins at tick 2
    assert_eq!(lines[1].snapshot.population, 20);
    assert_eq!(lines[2].snapshot.population, 30);
    assert_eq!(lines[1].active_buildings, 7);
    assert_eq!(lines[2].active_buildings, 8);
    // School at tick 3, factory gone at tick 4
    assert_eq!(lines[3].active_buildings, 9);
    assert_eq!(lines[4].active_buildings, 8);

    let written: RunSummary =
        serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(written.total_ticks, 6);
    assert_eq!(written.peak_population, 30);
    let last = summary.final_snapshot.unwrap();
    assert_eq!(last.population, lines[5].snapshot.population);
    assert!((last.happiness - lines[5].snapshot.happiness).abs() < 1e-9);
    assert!((last.income - written.final_snapshot.unwrap().income).abs() < 1e-9);
}

#[test]
fn test_removing_factory_raises_happiness() {
    let scenario = sample_scenario();
    let mut city = City::new(&scenario.layout, MetricsEngine::with_defaults()).unwrap();

    let before = city.tick();
    city.remove_building(&"bld_00004".into()).unwrap();
    let after = city.tick();

    assert!(after.happiness > before.happiness);
    assert!(after.income < before.income);
}

#[test]
fn test_custom_tuning_file() {
    let dir = tempfile::tempdir().unwrap();
    let tuning_path = dir.path().join("tuning.toml");
    std::fs::write(
        &tuning_path,
        "[globals]\nlambda = 2.0\ntheta = 0.5\n",
    )
    .unwrap();

    let engine = MetricsEngine::from_config_file(&tuning_path).unwrap();
    assert_eq!(engine.provider().base, CoefficientSet::default().base);

    let mut tight = City::new(&fixtures::sample_layout(), engine).unwrap();
    let mut loose = City::new(&fixtures::sample_layout(), MetricsEngine::with_defaults()).unwrap();
    tight.tick();
    loose.tick();

    // Shorter reach and a higher cutoff keep fewer pairs
    let tight_links: usize = tight.inspect().iter().map(|r| r.links).sum();
    let loose_links: usize = loose.inspect().iter().map(|r| r.links).sum();
    assert!(tight_links < loose_links);
}

#[test]
fn test_inspection_after_run() {
    let scenario = sample_scenario();
    let mut city = City::new(&scenario.layout, MetricsEngine::with_defaults()).unwrap();
    assert!(city.inspect().is_empty());

    scenario.run(&mut city, 6).unwrap();
    let reports = city.inspect();

    assert_eq!(reports.len(), 8);
    let school = reports.iter().find(|r| r.id.as_str() == "bld_00009").unwrap();
    assert!(school.active);
    assert!(reports.iter().all(|r| r.industrial_nuisance == 0.0));
}

#[test]
fn test_bundled_downtown_scenario() {
    let scenario = Scenario::from_str(include_str!("../../../scenarios/downtown.json")).unwrap();
    let mut city = City::new(&scenario.layout, MetricsEngine::with_defaults()).unwrap();

    let summary = scenario.run(&mut city, scenario.ticks.unwrap()).unwrap();

    assert_eq!(summary.total_ticks, 12);
    assert_eq!(city.building_count(), 10);
    // The corner house never reaches a road; the new one sits on the extension
    assert!(city.building(&"bld_00009".into()).map_or(false, |b| !b.active));
    assert!(city.building(&"bld_00011".into()).unwrap().active);
    assert_eq!(city.building(&"bld_00010".into()).unwrap().meta.name, "Foundry Green");
}
