//! PatternMatcher - combines band, rule and statistical evidence per pattern
//! and aggregates the survivors into a profile.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::classification::HierarchicalClassifier;
use crate::domain::features::{FeatureVector, Pillar};
use crate::domain::patterns::{evaluate_tags, PatternDefinition, PatternLibrary, PredicateOutcome};
use crate::domain::scoring::CategoryScores;

use super::evolution::predict_evolution;
use super::profile::{
    softmax, stability, success_modifier, uniqueness, MatchScores, PatternAnalysis, PatternMatch,
    PatternProfile, PRIMARY_CONFIDENCE, SECONDARY_CONFIDENCE,
};
use super::StatisticalProfiles;

/// Overrun (in score points) at which band-match decays by a factor of e.
const BAND_DECAY: f64 = 20.0;

/// Matcher tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherSettings {
    /// Candidates must score strictly above this.
    pub candidate_threshold: f64,
    pub mixture_temperature: f64,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            candidate_threshold: 0.3,
            mixture_temperature: 1.0,
        }
    }
}

/// Scores every pattern of a library against one entity.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    library: Arc<PatternLibrary>,
    classifier: Option<Arc<HierarchicalClassifier>>,
    profiles: Option<Arc<StatisticalProfiles>>,
    settings: MatcherSettings,
}

impl PatternMatcher {
    pub fn new(library: Arc<PatternLibrary>) -> Self {
        Self {
            library,
            classifier: None,
            profiles: None,
            settings: MatcherSettings::default(),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<HierarchicalClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Enables statistical matching. Empty profiles are ignored.
    pub fn with_profiles(mut self, profiles: Arc<StatisticalProfiles>) -> Self {
        if !profiles.is_empty() {
            self.profiles = Some(profiles);
        }
        self
    }

    pub fn with_settings(mut self, settings: MatcherSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    /// Matches one entity against the whole library.
    ///
    /// A pattern covered by a classifier model is only considered if the
    /// classifier emitted it. Never fails.
    pub fn match_patterns(&self, vector: &FeatureVector, scores: &CategoryScores) -> PatternAnalysis {
        let classified: BTreeMap<String, f64> = self
            .classifier
            .as_ref()
            .map(|c| {
                c.classify(vector)
                    .into_iter()
                    .map(|m| (m.pattern, m.probability))
                    .collect()
            })
            .unwrap_or_default();

        let mut matches = Vec::with_capacity(self.library.len());
        for def in self.library.patterns() {
            let classifier_probability = classified.get(&def.name).copied();
            let covered = self.classifier.as_ref().is_some_and(|c| c.covers(&def.name));
            if covered && classifier_probability.is_none() {
                debug!(pattern = %def.name, "Pattern rejected by classifier");
                continue;
            }
            matches.push(self.score_pattern(def, vector, scores, classifier_probability));
        }

        aggregate(matches, &self.library, vector, &self.settings)
    }

    /// Scores a single pattern.
    pub fn score_pattern(
        &self,
        def: &PatternDefinition,
        vector: &FeatureVector,
        scores: &CategoryScores,
        classifier_probability: Option<f64>,
    ) -> PatternMatch {
        let band = band_match(def, scores);
        let (rule, gaps) = rule_match(def, vector);
        let statistical = self
            .profiles
            .as_ref()
            .and_then(|p| p.similarity(def, scores, vector));

        let confidence = match statistical {
            Some(s) => 0.4 * band + 0.4 * rule + 0.2 * s,
            None => 0.5 * band + 0.5 * rule,
        };

        PatternMatch::new(
            def.name.clone(),
            def.category,
            confidence,
            MatchScores {
                band,
                rule,
                statistical,
                classifier: classifier_probability,
            },
        )
        .with_gaps(gaps)
    }
}

/// Mean over pillars of 1.0 inside the band, else `exp(-overrun / 20)`.
pub fn band_match(def: &PatternDefinition, scores: &CategoryScores) -> f64 {
    let total: f64 = Pillar::all()
        .iter()
        .map(|&pillar| {
            let overrun = def.band(pillar).overrun(scores.get(pillar));
            (-overrun / BAND_DECAY).exp()
        })
        .sum();
    total / Pillar::all().len() as f64
}

/// Fraction of satisfied predicates, plus gap descriptions.
///
/// Required and optional predicates are satisfied when met. Exclusions are
/// satisfied when evaluable and not holding. Unevaluable predicates always
/// count as unmet. A pattern with no predicates scores a neutral 0.5.
pub fn rule_match(def: &PatternDefinition, vector: &FeatureVector) -> (f64, Vec<String>) {
    fn note_missing(gaps: &mut Vec<String>, feature: &str) {
        let gap = format!("missing {}", feature);
        if !gaps.contains(&gap) {
            gaps.push(gap);
        }
    }

    let mut satisfied = 0usize;
    let mut gaps: Vec<String> = Vec::new();

    for (feature, predicate) in &def.required {
        match predicate.evaluate(vector, feature) {
            PredicateOutcome::Met => satisfied += 1,
            PredicateOutcome::Unmet => gaps.push(format!("needs {}", predicate.describe(feature))),
            PredicateOutcome::Unevaluable => note_missing(&mut gaps, feature),
        }
    }
    for (feature, predicate) in &def.optional {
        match predicate.evaluate(vector, feature) {
            PredicateOutcome::Met => satisfied += 1,
            PredicateOutcome::Unmet => {}
            PredicateOutcome::Unevaluable => note_missing(&mut gaps, feature),
        }
    }
    for (feature, predicate) in &def.exclusions {
        match predicate.evaluate(vector, feature) {
            PredicateOutcome::Unmet => satisfied += 1,
            PredicateOutcome::Met => gaps.push(format!("excluded by {}", predicate.describe(feature))),
            PredicateOutcome::Unevaluable => note_missing(&mut gaps, feature),
        }
    }

    let total = def.predicate_count();
    if total == 0 {
        return (0.5, gaps);
    }
    (satisfied as f64 / total as f64, gaps)
}

/// Aggregates per-pattern matches into a profile.
///
/// Only matches strictly above the candidate threshold are kept. Ranking is
/// by confidence, ties broken by library declaration order.
pub fn aggregate(
    matches: Vec<PatternMatch>,
    library: &PatternLibrary,
    vector: &FeatureVector,
    settings: &MatcherSettings,
) -> PatternAnalysis {
    let tags = evaluate_tags(vector);

    let mut candidates: Vec<PatternMatch> = matches
        .into_iter()
        .filter(|m| m.confidence > settings.candidate_threshold)
        .collect();
    candidates.sort_by_key(|m| library.declaration_index(&m.pattern).unwrap_or(usize::MAX));
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    if candidates.is_empty() {
        debug!("No pattern cleared the candidate threshold");
        return PatternAnalysis {
            profile: None,
            tags,
            warnings: Vec::new(),
            success_modifier: 1.0,
        };
    }

    let warnings = detect_conflicts(&candidates, library);

    let strong = candidates
        .iter()
        .filter(|m| m.confidence >= SECONDARY_CONFIDENCE)
        .count();
    let confidences: Vec<f64> = candidates.iter().map(|m| m.confidence).collect();
    let mixture = candidates
        .iter()
        .map(|m| m.pattern.clone())
        .zip(softmax(&confidences, settings.mixture_temperature))
        .collect();

    let mut ranked = candidates.into_iter();
    let Some(primary) = ranked.next() else {
        return PatternAnalysis {
            profile: None,
            tags,
            warnings,
            success_modifier: 1.0,
        };
    };
    let secondary: Vec<PatternMatch> = ranked.collect();

    let stability = stability(primary.confidence, secondary.first().map(|m| m.confidence));
    let uniqueness = uniqueness(strong);

    let def = library.get(&primary.pattern);
    let evolution = def.map(|d| predict_evolution(d, vector)).unwrap_or_default();
    let typical_success_rate = def.map(|d| d.typical_success_rate).unwrap_or(0.5);
    let modifier = success_modifier(typical_success_rate, primary.confidence, stability);

    debug!(
        primary = %primary.pattern,
        confidence = primary.confidence,
        candidates = 1 + secondary.len(),
        stability,
        uniqueness,
        "Pattern profile assembled"
    );

    PatternAnalysis {
        profile: Some(PatternProfile {
            primary,
            secondary,
            mixture,
            tags: tags.clone(),
            evolution,
            stability,
            uniqueness,
        }),
        tags,
        warnings,
        success_modifier: modifier,
    }
}

/// Incompatible pairs both at >= 0.5, and compatible patterns missing from a
/// strong primary.
fn detect_conflicts(ranked: &[PatternMatch], library: &PatternLibrary) -> Vec<String> {
    let mut warnings = Vec::new();

    let strong: Vec<&PatternMatch> = ranked
        .iter()
        .filter(|m| m.confidence >= SECONDARY_CONFIDENCE)
        .collect();
    for (i, a) in strong.iter().enumerate() {
        for b in &strong[i + 1..] {
            if library.are_incompatible(&a.pattern, &b.pattern) {
                warn!(first = %a.pattern, second = %b.pattern, "Incompatible patterns both matched");
                warnings.push(format!(
                    "Conflicting patterns: {} ({:.2}) and {} ({:.2}) are incompatible",
                    a.pattern, a.confidence, b.pattern, b.confidence
                ));
            }
        }
    }

    if let Some(primary) = ranked.first() {
        if primary.confidence >= PRIMARY_CONFIDENCE {
            if let Some(def) = library.get(&primary.pattern) {
                for expected in &def.compatible {
                    if !ranked.iter().any(|m| &m.pattern == expected) {
                        debug!(primary = %primary.pattern, expected = %expected, "Compatible pattern absent");
                        warnings.push(format!(
                            "Expected compatible pattern {} not detected alongside {}",
                            expected, primary.pattern
                        ));
                    }
                }
            }
        }
    }

    warnings
}
