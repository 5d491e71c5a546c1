//! PatternDefinition - an immutable, named business archetype.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::features::Pillar;

use super::{MasterCategory, Predicate};

/// Inclusive 0-100 band for one pillar score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    /// The unconstrained band.
    pub const FULL: Band = Band { min: 0.0, max: 100.0 };

    /// Distance outside the band; 0.0 when inside.
    pub fn overrun(&self, score: f64) -> f64 {
        if score < self.min {
            self.min - score
        } else if score > self.max {
            score - self.max
        } else {
            0.0
        }
    }

    /// Returns true if `min <= max` and both lie within 0-100.
    pub fn is_well_formed(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min <= self.max
            && self.min >= 0.0
            && self.max <= 100.0
    }
}

/// A named business pattern, built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub name: String,
    pub display_name: String,
    pub category: MasterCategory,
    #[serde(default)]
    pub description: String,

    /// Declared pillar bands; pillars not listed are unconstrained.
    #[serde(default)]
    pub bands: BTreeMap<Pillar, Band>,

    #[serde(default)]
    pub required: BTreeMap<String, Predicate>,
    #[serde(default)]
    pub optional: BTreeMap<String, Predicate>,
    /// Conditions that argue against this pattern. A holding exclusion counts
    /// as a failed predicate.
    #[serde(default)]
    pub exclusions: BTreeMap<String, Predicate>,

    #[serde(default)]
    pub compatible: Vec<String>,
    #[serde(default)]
    pub incompatible: Vec<String>,
    #[serde(default)]
    pub evolves_to: Vec<String>,

    /// Typical raw ranges of key metrics; narrative use only.
    #[serde(default)]
    pub typical_ranges: BTreeMap<String, (f64, f64)>,

    /// Historical success rate of companies showing this pattern.
    pub typical_success_rate: f64,

    /// Features appended to the pillar scores for statistical matching.
    #[serde(default)]
    pub key_features: Vec<String>,
}

impl PatternDefinition {
    /// Band for a pillar, or [`Band::FULL`] if undeclared.
    pub fn band(&self, pillar: Pillar) -> Band {
        self.bands.get(&pillar).copied().unwrap_or(Band::FULL)
    }

    /// Total number of declared predicates (required, optional, exclusion).
    pub fn predicate_count(&self) -> usize {
        self.required.len() + self.optional.len() + self.exclusions.len()
    }

    /// Every feature name referenced by a predicate or as a key feature.
    pub fn referenced_features(&self) -> impl Iterator<Item = &str> {
        self.required
            .keys()
            .chain(self.optional.keys())
            .chain(self.exclusions.keys())
            .chain(self.key_features.iter())
            .map(String::as_str)
    }

    /// Every pattern name referenced through compatibility or evolution.
    pub fn referenced_patterns(&self) -> impl Iterator<Item = &str> {
        self.compatible
            .iter()
            .chain(self.incompatible.iter())
            .chain(self.evolves_to.iter())
            .map(String::as_str)
    }

    pub fn is_incompatible_with(&self, other: &str) -> bool {
        self.incompatible.iter().any(|n| n == other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patterns::library::from_yaml;

    #[test]
    fn band_overrun() {
        let band = Band { min: 40.0, max: 70.0 };
        assert_eq!(band.overrun(55.0), 0.0);
        assert_eq!(band.overrun(30.0), 10.0);
        assert_eq!(band.overrun(85.0), 15.0);
        assert_eq!(band.overrun(40.0), 0.0);
    }

    #[test]
    fn band_well_formed() {
        assert!(Band::FULL.is_well_formed());
        assert!(!Band { min: 70.0, max: 40.0 }.is_well_formed());
        assert!(!Band { min: -1.0, max: 40.0 }.is_well_formed());
    }

    #[test]
    fn deserializes_minimal_definition() {
        let yaml = r#"
name: lean_startup
display_name: Lean Startup
category: capital_efficient
typical_success_rate: 0.4
bands:
  capital: { min: 20, max: 60 }
required:
  team_size: { max: 15 }
"#;
        let def: PatternDefinition = from_yaml(yaml).unwrap();
        assert_eq!(def.category, MasterCategory::CapitalEfficient);
        assert_eq!(def.band(Pillar::Capital), Band { min: 20.0, max: 60.0 });
        assert_eq!(def.band(Pillar::People), Band::FULL);
        assert_eq!(def.predicate_count(), 1);
        assert_eq!(def.referenced_features().collect::<Vec<_>>(), vec!["team_size"]);
    }
}
