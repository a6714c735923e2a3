//! Building Inspection
//!
//! Per-building accessibility figures for the most recent tick.

use serde::Serialize;

use city_model::{Building, BuildingId, BuildingType, Category, Tile};
use metrics_engine::{CoefficientProvider, Evaluation, LEISURE_TYPES};

use crate::roads::GridRoads;

/// Accessibility figures for one building
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingReport {
    pub id: BuildingId,
    pub building_type: BuildingType,
    pub category: Category,
    pub tile: Option<Tile>,
    pub active: bool,
    /// Effective workers reachable from active houses
    pub workers: f64,
    /// Attractiveness boost from nearby leisure, capped at 0.35
    pub leisure_bonus: f64,
    /// Raw influence reaching this building from leisure amenities
    pub leisure_influence: f64,
    /// Short-range factory nuisance
    pub industrial_nuisance: f64,
    /// Influence pairs this building takes part in
    pub links: usize,
}

/// Builds one report per building, in id order.
///
/// `buildings` must be the slice `evaluation` was computed from.
pub fn inspect<P: CoefficientProvider + ?Sized>(
    buildings: &[Building],
    evaluation: &Evaluation,
    provider: &P,
    roads: &GridRoads,
) -> Vec<BuildingReport> {
    let access = evaluation.accessibility(buildings);

    let mut reports: Vec<BuildingReport> = buildings
        .iter()
        .map(|building| {
            let id = &building.id;
            BuildingReport {
                id: id.clone(),
                building_type: building.building_type,
                category: provider.category_for_type(building.building_type),
                tile: roads.lot(id),
                active: building.active,
                workers: access.worker_access(id),
                leisure_bonus: access.leisure_bonus(id),
                leisure_influence: access.influence_to(id, &LEISURE_TYPES),
                industrial_nuisance: access.nearest_penalty(id, &[BuildingType::Factory]),
                links: evaluation.table.links_of(id).count(),
            }
        })
        .collect();
    reports.sort_by(|a, b| a.id.cmp(&b.id));
    reports
}

/// Renders reports as a fixed-width text table.
pub fn format_reports(reports: &[BuildingReport]) -> String {
    let mut out = format!(
        "{:<12} {:<9} {:<8} {:>7} {:>6} {:>8} {:>7} {:>8} {:>9}\n",
        "id", "type", "tile", "active", "links", "workers", "leisure", "bonus", "nuisance"
    );
    for report in reports {
        let tile = report
            .tile
            .map(|t| format!("{},{}", t.x, t.y))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<12} {:<9} {:<8} {:>7} {:>6} {:>8.2} {:>7.3} {:>8.3} {:>9.3}\n",
            report.id.as_str(),
            report.building_type.as_str(),
            tile,
            if report.active { "yes" } else { "no" },
            report.links,
            report.workers,
            report.leisure_influence,
            report.leisure_bonus,
            report.industrial_nuisance,
        ));
    }
    out
}
