//! Two-tier pattern classification.
//!
//! Tier 1 scores each master category and acts purely as a gate. Tier 2
//! scores each pattern whose category passed, using the pattern's own
//! feature subset, scaler and tuned threshold.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::features::FeatureVector;
use crate::domain::patterns::{MasterCategory, PatternLibrary};
use crate::ports::{BinaryClassifier, ClassifierError};

use super::StandardScaler;

/// Categories scoring below this are skipped entirely.
pub const DEFAULT_GATE_THRESHOLD: f64 = 0.3;

/// Patterns are emitted at this fraction of their tuned threshold; the
/// matcher makes the final call.
pub const INCLUSION_MARGIN: f64 = 0.8;

/// A classifier bound to the encoded columns it was trained on.
#[derive(Clone)]
pub struct ScoredModel {
    pub features: Vec<String>,
    pub scaler: Option<StandardScaler>,
    pub classifier: Arc<dyn BinaryClassifier>,
}

impl ScoredModel {
    pub fn new(features: Vec<String>, classifier: Arc<dyn BinaryClassifier>) -> Self {
        Self {
            features,
            scaler: None,
            classifier,
        }
    }

    pub fn with_scaler(mut self, scaler: StandardScaler) -> Self {
        self.scaler = Some(scaler);
        self
    }

    /// Selects, scales and scores one vector.
    pub fn score(&self, vector: &FeatureVector) -> Result<f64, ClassifierError> {
        let row = vector.select(&self.features);
        let row = match &self.scaler {
            Some(scaler) => scaler.transform(&row)?,
            None => row,
        };
        let p = self.classifier.predict_probability(&row)?;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(ClassifierError::InvalidOutput(p));
        }
        Ok(p)
    }
}

impl fmt::Debug for ScoredModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoredModel")
            .field("features", &self.features.len())
            .field("scaled", &self.scaler.is_some())
            .field("family", &self.classifier.family())
            .finish()
    }
}

/// Tier-2 model for one pattern.
#[derive(Debug, Clone)]
pub struct PatternModel {
    pub model: ScoredModel,
    /// Tuned decision threshold from training.
    pub threshold: f64,
}

/// A pattern emitted by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierMatch {
    pub pattern: String,
    pub category: MasterCategory,
    pub probability: f64,
    pub threshold: f64,
    /// Gate probability of the pattern's category, if a gate model exists.
    pub gate_probability: Option<f64>,
}

/// Category gates plus per-pattern models over one pattern library.
#[derive(Debug, Clone)]
pub struct HierarchicalClassifier {
    library: Arc<PatternLibrary>,
    gates: BTreeMap<MasterCategory, ScoredModel>,
    patterns: BTreeMap<String, PatternModel>,
    gate_threshold: f64,
}

impl HierarchicalClassifier {
    pub fn new(library: Arc<PatternLibrary>) -> Self {
        Self {
            library,
            gates: BTreeMap::new(),
            patterns: BTreeMap::new(),
            gate_threshold: DEFAULT_GATE_THRESHOLD,
        }
    }

    pub fn with_gate_threshold(mut self, threshold: f64) -> Self {
        self.gate_threshold = threshold;
        self
    }

    pub fn with_gate(mut self, category: MasterCategory, model: ScoredModel) -> Self {
        self.gates.insert(category, model);
        self
    }

    /// Registers a pattern model. Names absent from the library are ignored.
    pub fn with_pattern(mut self, pattern: impl Into<String>, model: PatternModel) -> Self {
        let pattern = pattern.into();
        if self.library.get(&pattern).is_none() {
            warn!(pattern = %pattern, "Ignoring classifier for undeclared pattern");
            return self;
        }
        self.patterns.insert(pattern, model);
        self
    }

    /// Returns true if a tier-2 model exists for the pattern.
    pub fn covers(&self, pattern: &str) -> bool {
        self.patterns.contains_key(pattern)
    }

    pub fn pattern_model_count(&self) -> usize {
        self.patterns.len()
    }

    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Classifies one vector.
    ///
    /// Never fails: a category without a gate model passes, a pattern without
    /// a model is omitted, and a model that errors is logged and omitted.
    pub fn classify(&self, vector: &FeatureVector) -> Vec<ClassifierMatch> {
        let mut matches = Vec::new();

        for &category in MasterCategory::all() {
            let gate_probability = match self.gates.get(&category) {
                Some(gate) => match gate.score(vector) {
                    Ok(p) => Some(p),
                    Err(e) => {
                        warn!(category = category.as_str(), error = %e, "Category gate failed, passing through");
                        None
                    }
                },
                None => None,
            };

            if let Some(p) = gate_probability {
                if p < self.gate_threshold {
                    debug!(category = category.as_str(), probability = p, "Category gated out");
                    continue;
                }
            }

            for def in self.library.by_category(category) {
                let Some(pattern_model) = self.patterns.get(&def.name) else {
                    debug!(pattern = %def.name, "No classifier loaded for pattern");
                    continue;
                };
                let probability = match pattern_model.model.score(vector) {
                    Ok(p) => p,
                    Err(e) => {
                        warn!(pattern = %def.name, error = %e, "Pattern classifier failed");
                        continue;
                    }
                };
                if probability >= INCLUSION_MARGIN * pattern_model.threshold {
                    matches.push(ClassifierMatch {
                        pattern: def.name.clone(),
                        category,
                        probability,
                        threshold: pattern_model.threshold,
                        gate_probability,
                    });
                }
            }
        }

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Fixed(f64);

    impl BinaryClassifier for Fixed {
        fn predict_probability(&self, _inputs: &[f64]) -> Result<f64, ClassifierError> {
            Ok(self.0)
        }

        fn family(&self) -> &'static str {
            "fixed"
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl BinaryClassifier for Broken {
        fn predict_probability(&self, _inputs: &[f64]) -> Result<f64, ClassifierError> {
            Err(ClassifierError::Malformed("no trees".to_string()))
        }

        fn family(&self) -> &'static str {
            "broken"
        }
    }

    fn fixed(p: f64) -> ScoredModel {
        ScoredModel::new(vec!["team_size".to_string()], Arc::new(Fixed(p)))
    }

    fn pattern(p: f64, threshold: f64) -> PatternModel {
        PatternModel {
            model: fixed(p),
            threshold,
        }
    }

    fn library() -> Arc<PatternLibrary> {
        Arc::new(PatternLibrary::builtin().unwrap())
    }

    fn vector() -> FeatureVector {
        FeatureVector::from_record(json!({"team_size": 12}).as_object().unwrap())
    }

    #[test]
    fn includes_patterns_within_margin_of_threshold() {
        let classifier = HierarchicalClassifier::new(library())
            .with_pattern("efficient_b2b_saas", pattern(0.41, 0.5))
            .with_pattern("blitzscaler", pattern(0.39, 0.5));

        let matches = classifier.classify(&vector());
        let names: Vec<_> = matches.iter().map(|m| m.pattern.as_str()).collect();
        assert_eq!(names, vec!["efficient_b2b_saas"]);
    }

    #[test]
    fn low_gate_skips_category() {
        let classifier = HierarchicalClassifier::new(library())
            .with_gate(MasterCategory::EfficientGrowth, fixed(0.2))
            .with_pattern("efficient_b2b_saas", pattern(0.9, 0.5));

        assert!(classifier.classify(&vector()).is_empty());
    }

    #[test]
    fn passing_gate_is_recorded() {
        let classifier = HierarchicalClassifier::new(library())
            .with_gate(MasterCategory::EfficientGrowth, fixed(0.7))
            .with_pattern("efficient_b2b_saas", pattern(0.9, 0.5));

        let matches = classifier.classify(&vector());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].gate_probability, Some(0.7));
        assert_eq!(matches[0].category, MasterCategory::EfficientGrowth);
    }

    #[test]
    fn failing_model_is_omitted() {
        let classifier = HierarchicalClassifier::new(library())
            .with_pattern(
                "efficient_b2b_saas",
                PatternModel {
                    model: ScoredModel::new(vec![], Arc::new(Broken)),
                    threshold: 0.5,
                },
            )
            .with_pattern("blitzscaler", pattern(0.9, 0.5));

        let matches = classifier.classify(&vector());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].pattern, "blitzscaler");
    }

    #[test]
    fn undeclared_pattern_is_ignored() {
        let classifier =
            HierarchicalClassifier::new(library()).with_pattern("not_a_pattern", pattern(0.9, 0.5));
        assert!(classifier.is_empty());
        assert!(!classifier.covers("not_a_pattern"));
    }

    #[test]
    fn scaler_width_mismatch_is_caught() {
        let model = fixed(0.9).with_scaler(StandardScaler::identity(3));
        assert!(matches!(
            model.score(&vector()),
            Err(ClassifierError::WidthMismatch { expected: 3, actual: 1 })
        ));
    }
}
