//! Metric Types
//!
//! The per-tick aggregate output of the metrics engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Residents contributed by each active house.
pub const POPULATION_PER_HOUSE: u32 = 10;

/// One of the three influence-driven metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Income,
    Happiness,
    Wellness,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Income, Metric::Happiness, Metric::Wellness];
}

/// Aggregate city metrics for one tick.
///
/// Immutable once produced; every tick yields a fresh value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Open-ended; normalized for display by the consumer.
    pub income: f64,
    pub happiness: f64,
    pub wellness: f64,
    pub population: u32,
}

impl MetricsSnapshot {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Income => self.income,
            Metric::Happiness => self.happiness,
            Metric::Wellness => self.wellness,
        }
    }

    /// True when every field carries the exact same bits as `other`.
    pub fn bit_identical(&self, other: &MetricsSnapshot) -> bool {
        self.income.to_bits() == other.income.to_bits()
            && self.happiness.to_bits() == other.happiness.to_bits()
            && self.wellness.to_bits() == other.wellness.to_bits()
            && self.population == other.population
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "income {:.2} | happiness {:.2} | wellness {:.2} | population {}",
            self.income, self.happiness, self.wellness, self.population
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rounds_to_two_places() {
        let snapshot = MetricsSnapshot {
            income: 4.5,
            happiness: 61.237,
            wellness: 50.0,
            population: 20,
        };
        assert_eq!(
            snapshot.to_string(),
            "income 4.50 | happiness 61.24 | wellness 50.00 | population 20"
        );
    }

    #[test]
    fn test_get_by_metric() {
        let snapshot = MetricsSnapshot {
            income: 1.0,
            happiness: 2.0,
            wellness: 3.0,
            population: 0,
        };
        assert_eq!(snapshot.get(Metric::Income), 1.0);
        assert_eq!(snapshot.get(Metric::Happiness), 2.0);
        assert_eq!(snapshot.get(Metric::Wellness), 3.0);
    }

    #[test]
    fn test_bit_identical_distinguishes_signed_zero() {
        let a = MetricsSnapshot::default();
        let mut b = a;
        assert!(a.bit_identical(&b));
        b.income = -0.0;
        assert!(!a.bit_identical(&b));
    }
}
