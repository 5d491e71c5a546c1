//! DecisionObject - the orchestrator's immutable, auditable output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{ComponentId, PredictionStage};
use crate::domain::matching::{EvolutionPrediction, PatternAnalysis};
use crate::domain::patterns::Tag;
use crate::domain::scoring::{CategoryScores, FallbackReason, Verdict};

/// Pattern subsystem output as exposed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternAnalysisSummary {
    pub primary_pattern: Option<String>,
    pub primary_confidence: Option<f64>,
    pub secondary_patterns: Vec<String>,
    /// Display mixture: entries below 1% are omitted.
    pub pattern_mixture: BTreeMap<String, f64>,
    pub tags: Vec<Tag>,
    pub warnings: Vec<String>,
    pub stability: Option<f64>,
    pub uniqueness: Option<f64>,
    pub evolution: Vec<EvolutionPrediction>,
    pub success_modifier: f64,
}

impl From<&PatternAnalysis> for PatternAnalysisSummary {
    fn from(analysis: &PatternAnalysis) -> Self {
        let profile = analysis.profile.as_ref();
        Self {
            primary_pattern: profile.map(|p| p.primary.pattern.clone()),
            primary_confidence: profile.map(|p| p.primary.confidence),
            secondary_patterns: profile
                .map(|p| p.secondary.iter().map(|m| m.pattern.clone()).collect())
                .unwrap_or_default(),
            pattern_mixture: profile.map(|p| p.display_mixture()).unwrap_or_default(),
            tags: analysis.tags.clone(),
            warnings: analysis.warnings.clone(),
            stability: profile.map(|p| p.stability),
            uniqueness: profile.map(|p| p.uniqueness),
            evolution: profile.map(|p| p.evolution.clone()).unwrap_or_default(),
            success_modifier: analysis.success_modifier,
        }
    }
}

/// Audit metadata. `latency_ms` is the only field that varies between
/// identical requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionMetadata {
    pub latency_ms: u64,
    /// Components whose call succeeded.
    pub models_used: Vec<ComponentId>,
    /// Components that failed, with the failure kind.
    pub models_failed: BTreeMap<ComponentId, String>,
    pub fallback_used: bool,
    pub fallback_reason: Option<FallbackReason>,
    pub library_version: Option<String>,
    /// Terminal stage the request reached.
    pub stage: PredictionStage,
}

impl DecisionMetadata {
    pub fn new(stage: PredictionStage) -> Self {
        Self {
            latency_ms: 0,
            models_used: Vec::new(),
            models_failed: BTreeMap::new(),
            fallback_used: false,
            fallback_reason: None,
            library_version: None,
            stage,
        }
    }
}

/// Final decision for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionObject {
    pub success_probability: f64,
    pub confidence_score: f64,
    pub verdict: Verdict,
    /// Per-component probabilities as combined (recalibrated); failed
    /// components read 0.5.
    pub component_predictions: BTreeMap<ComponentId, f64>,
    /// Per-component probabilities as returned, before recalibration.
    pub raw_component_predictions: BTreeMap<ComponentId, f64>,
    pub component_agreement: f64,
    pub weights_used: BTreeMap<ComponentId, f64>,
    pub pattern_analysis: Option<PatternAnalysisSummary>,
    pub category_scores: CategoryScores,
    /// Model-free quality score; absent on the fallback path.
    pub quality_score: Option<f64>,
    pub key_factors: Vec<String>,
    pub risk_factors: Vec<String>,
    pub success_factors: Vec<String>,
    pub metadata: DecisionMetadata,
}

impl DecisionObject {
    /// The structurally valid result for input that yields no number at all.
    pub fn error(reason: FallbackReason) -> Self {
        let mut metadata = DecisionMetadata::new(PredictionStage::Fallback);
        metadata.fallback_used = true;
        metadata.fallback_reason = Some(reason);
        Self {
            success_probability: 0.5,
            confidence_score: 0.0,
            verdict: Verdict::Error,
            component_predictions: BTreeMap::new(),
            raw_component_predictions: BTreeMap::new(),
            component_agreement: 0.0,
            weights_used: BTreeMap::new(),
            pattern_analysis: None,
            category_scores: CategoryScores::neutral(),
            quality_score: None,
            key_factors: Vec::new(),
            risk_factors: Vec::new(),
            success_factors: Vec::new(),
            metadata,
        }
    }

    /// Copy with latency zeroed, for comparing repeated runs.
    pub fn without_latency(&self) -> Self {
        let mut copy = self.clone();
        copy.metadata.latency_ms = 0;
        copy
    }

    pub fn is_fallback(&self) -> bool {
        self.metadata.fallback_used
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_decision_is_valid() {
        let decision = DecisionObject::error(FallbackReason::FeaturePreparation {
            message: "input must be an object, got array".to_string(),
        });
        assert_eq!(decision.verdict, Verdict::Error);
        assert_eq!(decision.success_probability, 0.5);
        assert_eq!(decision.confidence_score, 0.0);
        assert!(decision.is_fallback());
    }

    #[test]
    fn serializes_component_keys_as_names() {
        let mut decision = DecisionObject::error(FallbackReason::ModelsUnavailable { active: 0, required: 1 });
        decision.weights_used.insert(ComponentId::Ensemble, 1.0);
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["weights_used"]["ensemble"], 1.0);
        assert_eq!(json["verdict"], "ERROR");
        assert_eq!(json["metadata"]["fallback_reason"]["kind"], "models_unavailable");
    }
}
