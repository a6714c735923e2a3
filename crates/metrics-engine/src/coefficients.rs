//! Coefficient loading for the metrics engine.
//!
//! All tuning constants and contribution tables are loaded from a TOML file.
//! Tables are sparse: a category or category pair with no entry contributes
//! zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use city_model::{BuildingType, Category, Metric};

/// Supplies the coefficient set and the type → category classifier.
///
/// Implementations must be deterministic and read-only for the duration of
/// one evaluation.
pub trait CoefficientProvider {
    /// Classifies a building type. Must be total.
    fn category_for_type(&self, building_type: BuildingType) -> Category;

    /// The coefficient set in force for this evaluation.
    fn model(&self) -> &CoefficientSet;
}

/// Complete coefficient set ("model").
///
/// A table present in the file replaces the default table as a whole;
/// missing tables keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoefficientSet {
    /// Global tuning constants
    pub globals: Globals,
    /// Type → category overrides; types not listed use the built-in class
    pub categories: BTreeMap<BuildingType, Category>,
    /// Flat per-building contribution by category
    pub base: BTreeMap<Category, BaseContribution>,
    /// Directed source → target contribution matrices, one per metric
    pub pairwise: PairwiseTables,
}

/// Global tuning constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Globals {
    /// Road distance cutoff; farther pairs never interact
    pub d_max: f64,
    /// Decay length; larger reaches farther
    pub lambda: f64,
    /// Minimum influence weight kept in the table
    pub theta: f64,
    pub happiness_base: f64,
    pub happiness_min: f64,
    pub happiness_max: f64,
    pub wellness_base: f64,
    pub wellness_min: f64,
    pub wellness_max: f64,
}

impl Default for Globals {
    fn default() -> Self {
        Self {
            d_max: 28.0,
            lambda: 7.5,
            theta: 0.08,
            happiness_base: 50.0,
            happiness_min: 0.0,
            happiness_max: 100.0,
            wellness_base: 50.0,
            wellness_min: 0.0,
            wellness_max: 100.0,
        }
    }
}

/// Flat contribution of one active building.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseContribution {
    pub income: f64,
    pub happiness: f64,
    pub wellness: f64,
}

impl BaseContribution {
    pub fn new(income: f64, happiness: f64, wellness: f64) -> Self {
        Self {
            income,
            happiness,
            wellness,
        }
    }
}

/// Sparse source → target matrix.
pub type PairwiseMatrix = BTreeMap<Category, BTreeMap<Category, f64>>;

/// One directed matrix per metric.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PairwiseTables {
    pub income: PairwiseMatrix,
    pub happiness: PairwiseMatrix,
    pub wellness: PairwiseMatrix,
}

impl PairwiseTables {
    pub fn matrix(&self, metric: Metric) -> &PairwiseMatrix {
        match metric {
            Metric::Income => &self.income,
            Metric::Happiness => &self.happiness,
            Metric::Wellness => &self.wellness,
        }
    }

    pub fn matrix_mut(&mut self, metric: Metric) -> &mut PairwiseMatrix {
        match metric {
            Metric::Income => &mut self.income,
            Metric::Happiness => &mut self.happiness,
            Metric::Wellness => &mut self.wellness,
        }
    }

    /// Directed contribution from `source` toward `target`; zero if absent.
    pub fn get(&self, metric: Metric, source: Category, target: Category) -> f64 {
        self.matrix(metric)
            .get(&source)
            .and_then(|row| row.get(&target))
            .copied()
            .unwrap_or(0.0)
    }

    /// Sets one directed entry.
    pub fn set(&mut self, metric: Metric, source: Category, target: Category, value: f64) {
        self.matrix_mut(metric)
            .entry(source)
            .or_default()
            .insert(target, value);
    }
}

impl Default for CoefficientSet {
    fn default() -> Self {
        let categories = BuildingType::ALL
            .iter()
            .map(|t| (*t, t.default_category()))
            .collect();

        let mut base = BTreeMap::new();
        base.insert(Category::Residential, BaseContribution::new(1.0, 0.0, 0.0));
        base.insert(Category::Commercial, BaseContribution::new(2.0, 0.0, 0.0));
        base.insert(Category::Retail, BaseContribution::new(3.0, 1.0, 0.0));
        base.insert(Category::Industrial, BaseContribution::new(5.0, -1.0, -1.0));
        base.insert(Category::Health, BaseContribution::new(-2.0, 0.0, 2.0));
        base.insert(Category::Education, BaseContribution::new(-1.5, 1.0, 0.0));
        base.insert(Category::Leisure, BaseContribution::new(-0.5, 1.0, 1.0));

        use Category::*;
        let mut pairwise = PairwiseTables::default();

        // Workers living near workplaces
        pairwise.set(Metric::Income, Residential, Commercial, 3.0);
        pairwise.set(Metric::Income, Residential, Industrial, 4.0);
        pairwise.set(Metric::Income, Residential, Retail, 2.0);
        pairwise.set(Metric::Income, Leisure, Commercial, 0.5);
        pairwise.set(Metric::Income, Industrial, Residential, -1.0);

        // Amenities near homes; industry is a nuisance
        pairwise.set(Metric::Happiness, Leisure, Residential, 6.0);
        pairwise.set(Metric::Happiness, Retail, Residential, 4.0);
        pairwise.set(Metric::Happiness, Education, Residential, 3.0);
        pairwise.set(Metric::Happiness, Health, Residential, 1.0);
        pairwise.set(Metric::Happiness, Commercial, Residential, 1.0);
        pairwise.set(Metric::Happiness, Industrial, Residential, -8.0);
        pairwise.set(Metric::Happiness, Industrial, Leisure, -4.0);

        pairwise.set(Metric::Wellness, Health, Residential, 8.0);
        pairwise.set(Metric::Wellness, Leisure, Residential, 3.0);
        pairwise.set(Metric::Wellness, Education, Residential, 2.0);
        pairwise.set(Metric::Wellness, Industrial, Residential, -6.0);
        pairwise.set(Metric::Wellness, Industrial, Health, -3.0);

        Self {
            globals: Globals::default(),
            categories,
            base,
            pairwise,
        }
    }
}

impl CoefficientSet {
    /// An empty set: default globals, built-in classes, no contributions.
    pub fn empty() -> Self {
        Self {
            globals: Globals::default(),
            categories: BTreeMap::new(),
            base: BTreeMap::new(),
            pairwise: PairwiseTables::default(),
        }
    }

    /// Loads coefficients from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses coefficients from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let set: CoefficientSet = toml::from_str(content)?;
        set.validate()?;
        Ok(set)
    }

    /// Serializes the set as a TOML string.
    pub fn to_toml(&self) -> Result<String, TomlSerializeError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Base contribution for a category; zero if absent.
    pub fn base_for(&self, category: Category) -> BaseContribution {
        self.base.get(&category).copied().unwrap_or_default()
    }

    /// Rejects values that would make the aggregate meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.globals;
        let named = [
            ("d_max", g.d_max),
            ("lambda", g.lambda),
            ("theta", g.theta),
            ("happiness_base", g.happiness_base),
            ("happiness_min", g.happiness_min),
            ("happiness_max", g.happiness_max),
            ("wellness_base", g.wellness_base),
            ("wellness_min", g.wellness_min),
            ("wellness_max", g.wellness_max),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{} must be finite", name)));
            }
        }
        if g.lambda <= 0.0 {
            return Err(ConfigError::Invalid("lambda must be positive".into()));
        }
        if g.d_max < 0.0 {
            return Err(ConfigError::Invalid("d_max must not be negative".into()));
        }
        if g.happiness_min > g.happiness_max {
            return Err(ConfigError::Invalid(
                "happiness_min exceeds happiness_max".into(),
            ));
        }
        if g.wellness_min > g.wellness_max {
            return Err(ConfigError::Invalid(
                "wellness_min exceeds wellness_max".into(),
            ));
        }

        for (category, base) in &self.base {
            if !(base.income.is_finite() && base.happiness.is_finite() && base.wellness.is_finite())
            {
                return Err(ConfigError::Invalid(format!(
                    "base contribution for {} must be finite",
                    category
                )));
            }
        }

        for metric in Metric::ALL {
            for (source, row) in self.pairwise.matrix(metric) {
                for (target, value) in row {
                    if !value.is_finite() {
                        return Err(ConfigError::Invalid(format!(
                            "pairwise {:?} {} -> {} must be finite",
                            metric, source, target
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

impl CoefficientProvider for CoefficientSet {
    fn category_for_type(&self, building_type: BuildingType) -> Category {
        self.categories
            .get(&building_type)
            .copied()
            .unwrap_or_else(|| building_type.default_category())
    }

    fn model(&self) -> &CoefficientSet {
        self
    }
}

/// Errors that can occur during coefficient loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the coefficient file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// Error parsing TOML
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
    /// Parsed but unusable values
    #[error("invalid coefficients: {0}")]
    Invalid(String),
}

/// Error that can occur during TOML serialization.
#[derive(Debug, thiserror::Error)]
#[error("TOML serialize error: {0}")]
pub struct TomlSerializeError(#[from] pub toml::ser::Error);

/// Generates the default coefficient file content.
pub fn default_tuning_toml() -> String {
    r#"# City influence tuning
#
# Influence weight between two road-connected buildings at road distance d:
#   w = exp(-d / lambda)
# Pairs farther than d_max, or with w below theta, do not interact.

[globals]
d_max = 28.0
lambda = 7.5
theta = 0.08
happiness_base = 50.0
happiness_min = 0.0
happiness_max = 100.0
wellness_base = 50.0
wellness_min = 0.0
wellness_max = 100.0

# Building type -> category. Types left out use the built-in class.
[categories]
house = "residential"
office = "commercial"
factory = "industrial"
hospital = "health"
mall = "retail"
school = "education"
park = "leisure"

# Flat contribution per active building
[base.residential]
income = 1.0

[base.commercial]
income = 2.0

[base.retail]
income = 3.0
happiness = 1.0

[base.industrial]
income = 5.0
happiness = -1.0
wellness = -1.0

[base.health]
income = -2.0
wellness = 2.0

[base.education]
income = -1.5
happiness = 1.0

[base.leisure]
income = -0.5
happiness = 1.0
wellness = 1.0

# [pairwise.<metric>.<source>] <target> = contribution, scaled by weight
[pairwise.income.residential]
commercial = 3.0
industrial = 4.0
retail = 2.0

[pairwise.income.leisure]
commercial = 0.5

[pairwise.income.industrial]
residential = -1.0

[pairwise.happiness.leisure]
residential = 6.0

[pairwise.happiness.retail]
residential = 4.0

[pairwise.happiness.education]
residential = 3.0

[pairwise.happiness.health]
residential = 1.0

[pairwise.happiness.commercial]
residential = 1.0

[pairwise.happiness.industrial]
residential = -8.0
leisure = -4.0

[pairwise.wellness.health]
residential = 8.0

[pairwise.wellness.leisure]
residential = 3.0

[pairwise.wellness.education]
residential = 2.0

[pairwise.wellness.industrial]
residential = -6.0
health = -3.0
"#
    .to_string()
}
