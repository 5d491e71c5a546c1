//! PredictionEngine - per-request orchestration of models, patterns and scoring.
//!
//! One call to [`PredictionEngine::predict`] walks the request through
//! [`PredictionStage`]s. Per-axis models and the pattern matcher run
//! concurrently; everything after collection is deterministic arithmetic
//! over their outputs. No request can fail: anything that prevents a
//! numeric prediction ends in the heuristic fallback instead.

use futures::future::join_all;
use futures::FutureExt;
use serde_json::Value;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::{OrchestratorConfig, ValidationError as ConfigValidationError};
use crate::domain::decision::{DecisionMetadata, DecisionObject, PatternAnalysisSummary};
use crate::domain::features::{FeaturePreparationError, FeatureVector, RawRecord};
use crate::domain::foundation::{ComponentId, PredictionStage, Probability, StateMachine};
use crate::domain::matching::{PatternAnalysis, PatternMatcher};
use crate::domain::scoring::{
    component_agreement, key_factors, mean_confidence, overall_confidence, pillar_factors,
    CategoryScores, FallbackAssessment, FallbackReason, QualityBlend, RecalibrationTable, Verdict,
    WeightTable,
};
use crate::ports::{DecisionObservation, DecisionObserver, ModelError, ModelOutput, ProbabilityModel};

use super::metrics::{EngineMetrics, MetricsSnapshot};

/// Combination settings resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub model_timeout: Duration,
    pub confidence_threshold: f64,
    pub default_model_confidence: f64,
    pub min_active_models: usize,
    pub weights: WeightTable,
    pub recalibration: RecalibrationTable,
    pub blend: QualityBlend,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&OrchestratorConfig::default()).unwrap_or_else(|_| Self {
            model_timeout: Duration::from_millis(2000),
            confidence_threshold: 0.65,
            default_model_confidence: 0.7,
            min_active_models: 1,
            weights: WeightTable::default(),
            recalibration: RecalibrationTable::default(),
            blend: QualityBlend::default(),
        })
    }
}

impl EngineSettings {
    /// Resolves settings from the orchestrator section.
    ///
    /// # Errors
    ///
    /// Returns the section's validation error, if any.
    pub fn from_config(config: &OrchestratorConfig) -> Result<Self, ConfigValidationError> {
        config.validate()?;
        Ok(Self {
            model_timeout: config.model_timeout(),
            confidence_threshold: config.confidence_threshold,
            default_model_confidence: config.default_model_confidence,
            min_active_models: config.min_active_models,
            weights: WeightTable::with_overrides(&config.weight_overrides()?),
            recalibration: RecalibrationTable::default(),
            blend: QualityBlend::default(),
        })
    }
}

type ModelOutcomes = BTreeMap<ComponentId, Result<ModelOutput, ModelError>>;

/// The success-probability engine.
///
/// Holds only shared read-only artifacts and atomic counters, so one
/// instance serves any number of concurrent requests.
pub struct PredictionEngine {
    models: BTreeMap<ComponentId, Arc<dyn ProbabilityModel>>,
    matcher: Arc<PatternMatcher>,
    observer: Arc<dyn DecisionObserver>,
    settings: EngineSettings,
    metrics: Arc<EngineMetrics>,
}

impl PredictionEngine {
    pub(super) fn new(
        models: BTreeMap<ComponentId, Arc<dyn ProbabilityModel>>,
        matcher: Arc<PatternMatcher>,
        observer: Arc<dyn DecisionObserver>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            models,
            matcher,
            observer,
            settings,
            metrics: Arc::new(EngineMetrics::new()),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn library_version(&self) -> &str {
        self.matcher.library().version()
    }

    /// Components with a model wired in.
    pub fn configured_models(&self) -> Vec<ComponentId> {
        self.models.keys().copied().collect()
    }

    /// Predicts from an arbitrary JSON value.
    ///
    /// Non-object input yields an `ERROR` decision; an object with no
    /// canonical feature goes through the fallback.
    pub async fn predict_value(&self, input: &Value) -> DecisionObject {
        let started = Instant::now();
        self.metrics.record_request();
        let decision = match FeatureVector::prepare(input) {
            Ok(vector) => self.run(vector).await,
            Err(error) => self.on_preparation_error(error),
        };
        self.finish(decision, started)
    }

    /// Predicts from a raw record.
    pub async fn predict(&self, record: &RawRecord) -> DecisionObject {
        let started = Instant::now();
        self.metrics.record_request();
        let decision = match FeatureVector::prepare_record(record) {
            Ok(vector) => self.run(vector).await,
            Err(error) => self.on_preparation_error(error),
        };
        self.finish(decision, started)
    }

    async fn run(&self, vector: FeatureVector) -> DecisionObject {
        let stage = PredictionStage::FeaturesPrepared;
        let vector = Arc::new(vector);
        let scores = CategoryScores::from_vector(&vector);

        let (outcomes, analysis) = tokio::join!(
            self.call_models(&vector),
            self.match_patterns(Arc::clone(&vector), scores)
        );
        let stage = advance(stage, PredictionStage::PredictionsCollected);

        for (component, outcome) in &outcomes {
            if let Err(error) = outcome {
                warn!(
                    component = component.as_str(),
                    kind = error.kind(),
                    error = %error,
                    "Model unavailable, using neutral prediction"
                );
                self.metrics.record_model_failure(error);
            }
        }

        let active_axes = outcomes.values().filter(|o| o.is_ok()).count();
        if active_axes < self.settings.min_active_models {
            let reason = FallbackReason::ModelsUnavailable {
                active: active_axes,
                required: self.settings.min_active_models,
            };
            return self.fallback(&vector, stage, reason, Some(&outcomes), analysis.as_ref());
        }

        self.combine(&vector, scores, stage, &outcomes, analysis)
    }

    fn combine(
        &self,
        vector: &FeatureVector,
        scores: CategoryScores,
        stage: PredictionStage,
        outcomes: &ModelOutcomes,
        analysis: Option<PatternAnalysis>,
    ) -> DecisionObject {
        let settings = &self.settings;
        let mut audit = ComponentAudit::from_outcomes(outcomes, &settings.recalibration);
        let mut confidences: Vec<f64> = outcomes
            .values()
            .map(|outcome| match outcome {
                Ok(output) => output.confidence.unwrap_or(settings.default_model_confidence),
                Err(_) => 0.0,
            })
            .collect();

        match pattern_output(analysis.as_ref()) {
            Ok(output) => {
                audit.record_active(ComponentId::Pattern, output.probability, output.probability, output.confidence);
                confidences.push(output.confidence.unwrap_or(settings.default_model_confidence));
            }
            Err(kind) => {
                audit.record_failed(ComponentId::Pattern, kind);
                confidences.push(0.0);
            }
        }

        let weights = settings
            .weights
            .normalize(&audit.active, settings.default_model_confidence);
        let stage = advance(stage, PredictionStage::WeightsComputed);

        let raw_score: f64 = weights
            .iter()
            .map(|(component, weight)| weight * audit.combined_value(*component))
            .sum();
        let stage = advance(stage, PredictionStage::Combined);

        let quality = settings.blend.quality_score(vector);
        let probability = settings.blend.blend(raw_score, quality);
        let stage = advance(stage, PredictionStage::Blended);

        // Agreement is over raw model outputs, before recalibration.
        let active_probabilities: Vec<f64> = audit
            .active
            .iter()
            .filter_map(|(component, _)| audit.raw.get(component).copied())
            .collect();
        let agreement = component_agreement(&active_probabilities);
        let confidence = overall_confidence(agreement, mean_confidence(&confidences));
        let verdict = Verdict::from_probability(probability, confidence, settings.confidence_threshold);
        let stage = advance(stage, PredictionStage::VerdictAssigned);

        debug!(
            raw_score,
            quality,
            probability,
            confidence,
            verdict = verdict.as_str(),
            "Prediction combined"
        );

        let active_signals: BTreeMap<ComponentId, f64> = audit
            .active
            .iter()
            .map(|(component, _)| (*component, audit.combined_value(*component)))
            .collect();
        let primary = analysis
            .as_ref()
            .and_then(PatternAnalysis::primary)
            .map(|m| (m.pattern.as_str(), m.confidence));
        let key_factors = key_factors(&active_signals, primary);
        let (risk_factors, success_factors) = pillar_factors(&scores);

        let mut metadata = DecisionMetadata::new(stage);
        metadata.models_used = audit.active.iter().map(|(c, _)| *c).collect();
        metadata.models_failed = audit.failed;
        metadata.library_version = Some(self.library_version().to_string());

        DecisionObject {
            success_probability: probability,
            confidence_score: confidence,
            verdict,
            component_predictions: audit.combined,
            raw_component_predictions: audit.raw,
            component_agreement: agreement,
            weights_used: weights,
            pattern_analysis: analysis.as_ref().map(PatternAnalysisSummary::from),
            category_scores: scores,
            quality_score: Some(quality),
            key_factors,
            risk_factors,
            success_factors,
            metadata,
        }
    }

    async fn call_models(&self, vector: &FeatureVector) -> ModelOutcomes {
        let timeout = self.settings.model_timeout;
        let calls = ComponentId::model_axes().iter().map(|component| async move {
            let outcome = match self.models.get(component) {
                Some(model) => call_model(model.as_ref(), vector, timeout).await,
                None => Err(ModelError::unavailable("no model configured")),
            };
            (*component, outcome)
        });
        join_all(calls).await.into_iter().collect()
    }

    async fn match_patterns(&self, vector: Arc<FeatureVector>, scores: CategoryScores) -> Option<PatternAnalysis> {
        let matcher = Arc::clone(&self.matcher);
        match tokio::task::spawn_blocking(move || matcher.match_patterns(&vector, &scores)).await {
            Ok(analysis) => Some(analysis),
            Err(error) => {
                warn!(error = %error, "Pattern matching aborted");
                None
            }
        }
    }

    fn on_preparation_error(&self, error: FeaturePreparationError) -> DecisionObject {
        let reason = FallbackReason::FeaturePreparation {
            message: error.to_string(),
        };
        match error {
            FeaturePreparationError::NotAnObject { found } => {
                warn!(found, "Rejected non-object input");
                self.metrics.record_error();
                let mut decision = DecisionObject::error(reason);
                decision.metadata.library_version = Some(self.library_version().to_string());
                decision
            }
            FeaturePreparationError::NoCanonicalFeatures { .. } => self.fallback(
                &FeatureVector::empty(),
                PredictionStage::FeaturesPrepared,
                reason,
                None,
                None,
            ),
        }
    }

    fn fallback(
        &self,
        vector: &FeatureVector,
        stage: PredictionStage,
        reason: FallbackReason,
        outcomes: Option<&ModelOutcomes>,
        analysis: Option<&PatternAnalysis>,
    ) -> DecisionObject {
        self.metrics.record_fallback();
        let assessment = FallbackAssessment::assess(vector, &self.settings.blend);
        warn!(
            reason = %reason,
            probability = assessment.probability,
            confidence = assessment.confidence,
            "Falling back to heuristic assessment"
        );

        let audit = outcomes
            .map(|outcomes| ComponentAudit::from_outcomes(outcomes, &self.settings.recalibration))
            .unwrap_or_default();
        // Axes that did answer keep their normalized share for the audit.
        let weights = self
            .settings
            .weights
            .normalize(&audit.active, self.settings.default_model_confidence);

        let mut metadata = DecisionMetadata::new(advance(stage, PredictionStage::Fallback));
        metadata.models_used = audit.active.iter().map(|(c, _)| *c).collect();
        metadata.models_failed = audit.failed;
        metadata.fallback_used = true;
        metadata.fallback_reason = Some(reason);
        metadata.library_version = Some(self.library_version().to_string());

        DecisionObject {
            success_probability: assessment.probability,
            confidence_score: assessment.confidence,
            verdict: assessment.verdict,
            component_predictions: audit.combined,
            raw_component_predictions: audit.raw,
            component_agreement: 0.0,
            weights_used: weights,
            pattern_analysis: analysis.map(PatternAnalysisSummary::from),
            category_scores: assessment.category_scores,
            quality_score: None,
            key_factors: Vec::new(),
            risk_factors: assessment.risk_factors,
            success_factors: assessment.success_factors,
            metadata,
        }
    }

    fn finish(&self, mut decision: DecisionObject, started: Instant) -> DecisionObject {
        decision.metadata.latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let observation = DecisionObservation::from(&decision);
        let observer = Arc::clone(&self.observer);
        if std::panic::catch_unwind(AssertUnwindSafe(|| observer.observe(&observation))).is_err() {
            warn!("Decision observer panicked");
        }
        decision
    }
}

impl std::fmt::Debug for PredictionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionEngine")
            .field("models", &self.configured_models())
            .field("library_version", &self.library_version())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Per-component bookkeeping for one request.
#[derive(Debug, Default)]
struct ComponentAudit {
    combined: BTreeMap<ComponentId, f64>,
    raw: BTreeMap<ComponentId, f64>,
    active: Vec<(ComponentId, Option<f64>)>,
    failed: BTreeMap<ComponentId, String>,
}

impl ComponentAudit {
    fn from_outcomes(outcomes: &ModelOutcomes, recalibration: &RecalibrationTable) -> Self {
        let mut audit = Self::default();
        for (component, outcome) in outcomes {
            match outcome {
                Ok(output) => audit.record_active(
                    *component,
                    output.probability,
                    recalibration.apply(output.probability),
                    output.confidence,
                ),
                Err(error) => audit.record_failed(*component, error.kind()),
            }
        }
        audit
    }

    fn record_active(&mut self, component: ComponentId, raw: f64, combined: f64, confidence: Option<f64>) {
        self.raw.insert(component, raw);
        self.combined.insert(component, combined);
        self.active.push((component, confidence));
    }

    fn record_failed(&mut self, component: ComponentId, kind: &str) {
        let neutral = Probability::NEUTRAL.value();
        self.raw.insert(component, neutral);
        self.combined.insert(component, neutral);
        self.failed.insert(component, kind.to_string());
    }

    fn combined_value(&self, component: ComponentId) -> f64 {
        self.combined
            .get(&component)
            .copied()
            .unwrap_or(Probability::NEUTRAL.value())
    }
}

/// The pattern subsystem's contribution, or the failure kind.
fn pattern_output(analysis: Option<&PatternAnalysis>) -> Result<ModelOutput, &'static str> {
    let analysis = analysis.ok_or("failed")?;
    let primary = analysis.primary().ok_or("no_candidates")?;
    let probability = Probability::new(0.5 * analysis.success_modifier).value();
    Ok(ModelOutput::new(probability).with_confidence(primary.confidence))
}

async fn call_model(
    model: &dyn ProbabilityModel,
    vector: &FeatureVector,
    timeout: Duration,
) -> Result<ModelOutput, ModelError> {
    let call = AssertUnwindSafe(model.predict_probability(vector)).catch_unwind();
    match tokio::time::timeout(timeout, call).await {
        Err(_) => Err(ModelError::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
        Ok(Err(_)) => Err(ModelError::failed("model panicked")),
        Ok(Ok(result)) => result.and_then(ModelOutput::validated),
    }
}

fn advance(stage: PredictionStage, next: PredictionStage) -> PredictionStage {
    match stage.transition_to(next) {
        Ok(next) => next,
        Err(error) => {
            warn!(error = %error, "Unexpected stage transition");
            stage
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::matching::{MatchScores, PatternMatch, PatternProfile};
    use crate::domain::patterns::MasterCategory;

    fn analysis_with_primary(confidence: f64, modifier: f64) -> PatternAnalysis {
        let primary = PatternMatch::new(
            "efficient_grower",
            MasterCategory::EfficientGrowth,
            confidence,
            MatchScores {
                band: confidence,
                rule: confidence,
                statistical: None,
                classifier: None,
            },
        );
        PatternAnalysis {
            profile: Some(PatternProfile {
                primary,
                secondary: Vec::new(),
                mixture: BTreeMap::new(),
                tags: Vec::new(),
                evolution: Vec::new(),
                stability: 1.0,
                uniqueness: 1.0,
            }),
            tags: Vec::new(),
            warnings: Vec::new(),
            success_modifier: modifier,
        }
    }

    #[test]
    fn pattern_output_scales_modifier() {
        let output = pattern_output(Some(&analysis_with_primary(0.8, 1.4))).unwrap();
        assert!((output.probability - 0.7).abs() < 1e-12);
        assert_eq!(output.confidence, Some(0.8));
    }

    #[test]
    fn pattern_output_clamps_to_unit_interval() {
        let output = pattern_output(Some(&analysis_with_primary(0.9, 2.0))).unwrap();
        assert_eq!(output.probability, 1.0);
    }

    #[test]
    fn pattern_output_reports_why_it_is_missing() {
        assert_eq!(pattern_output(None), Err("failed"));
        let empty = PatternAnalysis {
            profile: None,
            tags: Vec::new(),
            warnings: Vec::new(),
            success_modifier: 1.0,
        };
        assert_eq!(pattern_output(Some(&empty)), Err("no_candidates"));
    }

    #[test]
    fn audit_recalibrates_and_neutralizes() {
        let mut outcomes = ModelOutcomes::new();
        outcomes.insert(ComponentId::Ensemble, Ok(ModelOutput::new(0.00005)));
        outcomes.insert(ComponentId::Temporal, Err(ModelError::Timeout { timeout_ms: 5 }));
        let audit = ComponentAudit::from_outcomes(&outcomes, &RecalibrationTable::default());

        assert_eq!(audit.raw[&ComponentId::Ensemble], 0.00005);
        let recalibrated = audit.combined[&ComponentId::Ensemble];
        assert!((0.10..=0.20).contains(&recalibrated));
        assert_eq!(audit.combined[&ComponentId::Temporal], 0.5);
        assert_eq!(audit.failed[&ComponentId::Temporal], "timeout");
        assert_eq!(audit.active, vec![(ComponentId::Ensemble, None)]);
    }

    #[test]
    fn advance_keeps_stage_on_invalid_transition() {
        let stage = advance(PredictionStage::FeaturesPrepared, PredictionStage::Blended);
        assert_eq!(stage, PredictionStage::FeaturesPrepared);
    }

    #[test]
    fn default_settings_match_config_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.model_timeout, Duration::from_millis(2000));
        assert_eq!(settings.confidence_threshold, 0.65);
        assert_eq!(settings.min_active_models, 1);
    }

    #[test]
    fn settings_reject_invalid_config() {
        let config = OrchestratorConfig {
            model_timeout_ms: 0,
            ..Default::default()
        };
        assert!(EngineSettings::from_config(&config).is_err());
    }
}
