//! Metrics aggregation.
//!
//! Folds base contributions and influence-weighted pairwise contributions
//! into a single snapshot. Buildings are summed in id order and pairs in
//! canonical key order, so identical inputs give bit-identical output.

use std::collections::BTreeMap;

use city_model::{Building, BuildingId, Category, Metric, MetricsSnapshot, POPULATION_PER_HOUSE};
use tracing::warn;

use crate::coefficients::CoefficientProvider;
use crate::influence::InfluenceTable;

/// Clamp that tolerates NaN and never panics on inverted bounds.
fn bounded(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Adds `term` to `total` unless the sum would leave the finite range.
fn accumulate(total: &mut f64, term: f64, metric: Metric) {
    let next = *total + term;
    if next.is_finite() {
        *total = next;
    } else {
        warn!("Dropping {:?} term {} that would make the total non-finite", metric, term);
    }
}

/// Computes the snapshot for the active members of `buildings`.
///
/// Inactive buildings are ignored as if absent. Table entries naming a
/// building that is not active in `buildings` are skipped.
pub fn aggregate<P: CoefficientProvider + ?Sized>(
    buildings: &[Building],
    table: &InfluenceTable,
    provider: &P,
) -> MetricsSnapshot {
    let model = provider.model();
    let globals = &model.globals;

    let categories: BTreeMap<&BuildingId, Category> = buildings
        .iter()
        .filter(|b| b.active)
        .map(|b| (&b.id, provider.category_for_type(b.building_type)))
        .collect();

    let mut population: u32 = 0;
    let mut income = 0.0;
    let mut happiness = globals.happiness_base;
    let mut wellness = globals.wellness_base;

    for category in categories.values() {
        if *category == Category::Residential {
            population = population.saturating_add(POPULATION_PER_HOUSE);
        }
        let base = model.base_for(*category);
        accumulate(&mut income, base.income, Metric::Income);
        accumulate(&mut happiness, base.happiness, Metric::Happiness);
        accumulate(&mut wellness, base.wellness, Metric::Wellness);
    }

    for (key, entry) in table.iter() {
        let (Some(&a), Some(&b)) = (categories.get(key.low()), categories.get(key.high())) else {
            warn!(
                "Influence pair {}-{} names an inactive or unknown building",
                key.low(),
                key.high()
            );
            continue;
        };

        let directed = |metric: Metric| {
            model.pairwise.get(metric, a, b) + model.pairwise.get(metric, b, a)
        };
        accumulate(&mut income, entry.weight * directed(Metric::Income), Metric::Income);
        accumulate(
            &mut happiness,
            entry.weight * directed(Metric::Happiness),
            Metric::Happiness,
        );
        accumulate(
            &mut wellness,
            entry.weight * directed(Metric::Wellness),
            Metric::Wellness,
        );
    }

    MetricsSnapshot {
        income,
        happiness: bounded(happiness, globals.happiness_min, globals.happiness_max),
        wellness: bounded(wellness, globals.wellness_min, globals.wellness_max),
        population,
    }
}
