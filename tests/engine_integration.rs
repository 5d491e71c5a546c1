//! End-to-end tests for the prediction engine with mock per-axis models.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use venture_oracle::adapters::{InMemoryObserver, MockProbabilityModel};
use venture_oracle::domain::foundation::PredictionStage;
use venture_oracle::domain::patterns::PatternLibrary;
use venture_oracle::domain::scoring::FallbackReason;
use venture_oracle::domain::features::FeatureVector;
use venture_oracle::ports::{ModelError, ModelOutput, ProbabilityModel};
use venture_oracle::{ComponentId, EngineBuilder, EngineSettings, PredictionEngine, Verdict};

// =============================================================================
// Helpers
// =============================================================================

fn mock(component: ComponentId, probability: f64) -> Arc<MockProbabilityModel> {
    Arc::new(MockProbabilityModel::new(component, probability).with_confidence(0.8))
}

fn engine_with(models: Vec<Arc<MockProbabilityModel>>) -> PredictionEngine {
    let mut builder = EngineBuilder::new();
    for model in models {
        builder = builder.with_model(model);
    }
    builder.build().unwrap()
}

fn default_engine() -> PredictionEngine {
    engine_with(vec![
        mock(ComponentId::Ensemble, 0.62),
        mock(ComponentId::Temporal, 0.55),
        mock(ComponentId::Industry, 0.58),
    ])
}

fn strong_record() -> Value {
    json!({
        "funding_stage": "series_a",
        "total_capital_raised_usd": 12_000_000,
        "runway_months": 26,
        "burn_multiple": 0.8,
        "revenue_growth_rate_percent": 150,
        "gross_margin_percent": 78,
        "net_dollar_retention_percent": 128,
        "annual_revenue_run_rate": 4_000_000,
        "sector": "SaaS",
        "team_size": 60,
        "years_experience_avg": 12,
        "prior_successful_exits_count": 1
    })
}

struct PanickingModel;

#[async_trait]
impl ProbabilityModel for PanickingModel {
    fn component(&self) -> ComponentId {
        ComponentId::Ensemble
    }

    async fn predict_probability(&self, _: &FeatureVector) -> Result<ModelOutput, ModelError> {
        panic!("corrupt weights");
    }
}

fn tag_names(decision: &venture_oracle::DecisionObject) -> Vec<String> {
    decision
        .pattern_analysis
        .as_ref()
        .map(|p| p.tags.iter().map(|t| t.name.clone()).collect())
        .unwrap_or_default()
}

fn assert_in_range(decision: &venture_oracle::DecisionObject) {
    assert!(
        (0.05..=0.95).contains(&decision.success_probability),
        "probability {}",
        decision.success_probability
    );
    assert!(
        (0.0..=1.0).contains(&decision.confidence_score),
        "confidence {}",
        decision.confidence_score
    );
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn scenario_a_tags_and_consistent_verdict() {
    let engine = default_engine();
    let decision = engine
        .predict_value(&json!({
            "burn_multiple": 0.8,
            "revenue_growth_rate_percent": 150,
            "team_size": 60
        }))
        .await;

    let tags = tag_names(&decision);
    assert!(tags.contains(&"profitable".to_string()), "tags: {:?}", tags);
    assert!(tags.contains(&"hypergrowth".to_string()), "tags: {:?}", tags);

    assert_in_range(&decision);
    assert!(!decision.is_fallback());
    let expected = Verdict::from_probability(
        decision.success_probability,
        decision.confidence_score,
        engine.settings().confidence_threshold,
    );
    assert_eq!(decision.verdict, expected);
    assert_eq!(decision.metadata.stage, PredictionStage::VerdictAssigned);
}

#[tokio::test]
async fn scenario_b_empty_record_falls_back() {
    let engine = default_engine();
    let decision = engine.predict_value(&json!({})).await;

    assert!(decision.is_fallback());
    assert!(matches!(
        decision.metadata.fallback_reason,
        Some(FallbackReason::FeaturePreparation { .. })
    ));
    assert!((0.5..=0.6).contains(&decision.confidence_score));
    assert!(matches!(
        decision.verdict,
        Verdict::Pass | Verdict::ConditionalPass | Verdict::Fail
    ));
    assert_eq!(decision.metadata.stage, PredictionStage::Fallback);
    assert_in_range(&decision);
}

#[tokio::test]
async fn scenario_b_unknown_fields_only_falls_back() {
    let engine = default_engine();
    let decision = engine
        .predict_value(&json!({"favourite_colour": "teal", "mascot": "owl"}))
        .await;
    assert!(decision.is_fallback());
    assert_eq!(decision.confidence_score, 0.5);
}

#[tokio::test]
async fn scenario_c_tiny_probability_is_recalibrated() {
    let engine = engine_with(vec![
        mock(ComponentId::Ensemble, 0.00005),
        mock(ComponentId::Temporal, 0.55),
        mock(ComponentId::Industry, 0.58),
    ]);
    let decision = engine.predict_value(&strong_record()).await;

    let combined = decision.component_predictions[&ComponentId::Ensemble];
    assert!((0.10..=0.20).contains(&combined), "combined {}", combined);
    assert_eq!(decision.raw_component_predictions[&ComponentId::Ensemble], 0.00005);
}

#[tokio::test]
async fn scenario_d_single_strong_pattern() {
    let library = PatternLibrary::from_yaml_str(
        r#"
version: "test"
patterns:
  - name: alpha
    display_name: Alpha
    category: efficient_growth
    required:
      team_size: { min: 1 }
    typical_success_rate: 0.6
  - name: beta
    display_name: Beta
    category: deep_tech
    bands:
      capital: { min: 95, max: 100 }
      advantage: { min: 95, max: 100 }
      market: { min: 95, max: 100 }
      people: { min: 95, max: 100 }
    required:
      team_size: { min: 1000 }
    typical_success_rate: 0.3
"#,
    )
    .unwrap();

    let engine = EngineBuilder::new()
        .with_library(Arc::new(library))
        .with_model(mock(ComponentId::Ensemble, 0.6))
        .build()
        .unwrap();
    let decision = engine.predict_value(&json!({"team_size": 10})).await;

    let analysis = decision.pattern_analysis.expect("pattern analysis");
    assert_eq!(analysis.primary_pattern.as_deref(), Some("alpha"));
    assert!(analysis.primary_confidence.unwrap() >= 0.9);
    assert!(analysis.secondary_patterns.is_empty());
    assert_eq!(analysis.stability, Some(1.0));
    assert_eq!(analysis.uniqueness, Some(1.0));
    assert!(decision.metadata.models_used.contains(&ComponentId::Pattern));
}

// =============================================================================
// Failure handling
// =============================================================================

#[tokio::test]
async fn non_object_input_is_an_error_decision() {
    let engine = default_engine();
    for input in [json!([1, 2, 3]), json!("startup"), Value::Null, json!(42)] {
        let decision = engine.predict_value(&input).await;
        assert_eq!(decision.verdict, Verdict::Error, "input {}", input);
        assert_eq!(decision.success_probability, 0.5);
        assert_eq!(decision.confidence_score, 0.0);
    }
    assert_eq!(engine.metrics().errors, 4);
}

#[tokio::test]
async fn timed_out_model_is_neutral() {
    let slow = Arc::new(
        MockProbabilityModel::new(ComponentId::Temporal, 0.9).with_delay(Duration::from_millis(500)),
    );
    let settings = EngineSettings {
        model_timeout: Duration::from_millis(50),
        ..EngineSettings::default()
    };
    let engine = EngineBuilder::new()
        .with_settings(settings)
        .with_model(mock(ComponentId::Ensemble, 0.6))
        .with_model(slow.clone())
        .with_model(mock(ComponentId::Industry, 0.6))
        .build()
        .unwrap();

    let decision = engine.predict_value(&strong_record()).await;

    assert_eq!(slow.call_count(), 1);
    assert!(!decision.is_fallback());
    assert_eq!(decision.component_predictions[&ComponentId::Temporal], 0.5);
    assert_eq!(decision.metadata.models_failed[&ComponentId::Temporal], "timeout");
    assert!(!decision.weights_used.contains_key(&ComponentId::Temporal));
    assert!(!decision.metadata.models_used.contains(&ComponentId::Temporal));
    assert_eq!(engine.metrics().model_timeouts, 1);
}

#[tokio::test]
async fn failed_model_is_excluded_from_weights() {
    let engine = engine_with(vec![
        mock(ComponentId::Ensemble, 0.6),
        Arc::new(MockProbabilityModel::failing(
            ComponentId::Industry,
            ModelError::unavailable("sector model offline"),
        )),
        mock(ComponentId::Temporal, 0.6),
    ]);
    let decision = engine.predict_value(&strong_record()).await;

    assert_eq!(decision.metadata.models_failed[&ComponentId::Industry], "unavailable");
    assert_eq!(decision.component_predictions[&ComponentId::Industry], 0.5);
    let total: f64 = decision.weights_used.values().sum();
    assert!((total - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn out_of_range_model_output_is_a_failure() {
    let engine = engine_with(vec![
        mock(ComponentId::Ensemble, 1.7),
        mock(ComponentId::Temporal, 0.6),
        mock(ComponentId::Industry, 0.6),
    ]);
    let decision = engine.predict_value(&strong_record()).await;
    assert_eq!(decision.metadata.models_failed[&ComponentId::Ensemble], "invalid_output");
}

#[tokio::test]
async fn all_models_failing_triggers_fallback() {
    let engine = engine_with(vec![
        Arc::new(MockProbabilityModel::failing(ComponentId::Ensemble, ModelError::failed("boom"))),
        Arc::new(MockProbabilityModel::failing(ComponentId::Temporal, ModelError::failed("boom"))),
        Arc::new(MockProbabilityModel::failing(ComponentId::Industry, ModelError::failed("boom"))),
    ]);
    let decision = engine.predict_value(&strong_record()).await;

    assert!(decision.is_fallback());
    assert_eq!(
        decision.metadata.fallback_reason,
        Some(FallbackReason::ModelsUnavailable { active: 0, required: 1 })
    );
    assert!(matches!(
        decision.verdict,
        Verdict::Pass | Verdict::ConditionalPass | Verdict::Fail
    ));
    assert!((0.5..=0.9).contains(&decision.confidence_score));
    assert_eq!(decision.metadata.models_failed.len(), 3);
    assert_in_range(&decision);
    assert_eq!(engine.metrics().fallbacks, 1);
}

#[tokio::test]
async fn partial_failure_below_minimum_keeps_weights_of_answering_axes() {
    let settings = EngineSettings {
        min_active_models: 2,
        ..EngineSettings::default()
    };
    let engine = EngineBuilder::new()
        .with_settings(settings)
        .with_model(mock(ComponentId::Ensemble, 0.6))
        .build()
        .unwrap();

    let decision = engine.predict_value(&strong_record()).await;

    assert!(decision.is_fallback());
    assert_eq!(
        decision.metadata.fallback_reason,
        Some(FallbackReason::ModelsUnavailable { active: 1, required: 2 })
    );
    assert_eq!(decision.metadata.models_used, vec![ComponentId::Ensemble]);
    let total: f64 = decision.weights_used.values().sum();
    assert!((total - 1.0).abs() < 1e-6);
    assert_eq!(decision.weights_used.len(), 1);
    assert!(decision.weights_used.contains_key(&ComponentId::Ensemble));
}

#[tokio::test]
async fn panicking_model_is_recorded_as_failed() {
    let engine = EngineBuilder::new()
        .with_model(Arc::new(PanickingModel))
        .with_model(mock(ComponentId::Temporal, 0.6))
        .with_model(mock(ComponentId::Industry, 0.6))
        .build()
        .unwrap();

    let decision = engine.predict_value(&strong_record()).await;

    assert!(!decision.is_fallback());
    assert_eq!(decision.metadata.models_failed[&ComponentId::Ensemble], "failed");
    assert_eq!(decision.component_predictions[&ComponentId::Ensemble], 0.5);
    assert!(!decision.weights_used.contains_key(&ComponentId::Ensemble));
    assert_eq!(engine.metrics().model_failures, 1);
    assert_in_range(&decision);
}

#[tokio::test]
async fn engine_without_models_falls_back() {
    let engine = EngineBuilder::new().build().unwrap();
    let decision = engine.predict_value(&strong_record()).await;
    assert!(decision.is_fallback());
    assert_eq!(decision.metadata.models_failed[&ComponentId::Ensemble], "unavailable");
}

// =============================================================================
// Output properties
// =============================================================================

#[tokio::test]
async fn weights_sum_to_one() {
    let engine = default_engine();
    let decision = engine.predict_value(&strong_record()).await;
    let total: f64 = decision.weights_used.values().sum();
    assert!((total - 1.0).abs() < 1e-6, "weights {:?}", decision.weights_used);
}

#[tokio::test]
async fn identical_input_gives_identical_decision() {
    let engine = default_engine();
    let first = engine.predict_value(&strong_record()).await;
    let second = engine.predict_value(&strong_record()).await;
    assert_eq!(first.without_latency(), second.without_latency());
    assert_eq!(
        serde_json::to_string(&first.without_latency()).unwrap(),
        serde_json::to_string(&second.without_latency()).unwrap()
    );
}

#[tokio::test]
async fn key_factors_are_bounded_and_lead_with_pattern() {
    let engine = default_engine();
    let decision = engine.predict_value(&strong_record()).await;
    assert!(decision.key_factors.len() <= 5);
    if let Some(primary) = decision
        .pattern_analysis
        .as_ref()
        .and_then(|p| p.primary_pattern.clone())
    {
        assert!(decision.key_factors[0].contains(&primary));
    }
}

#[tokio::test]
async fn incompatible_patterns_raise_warning() {
    let library = PatternLibrary::from_yaml_str(
        r#"
version: "test"
patterns:
  - name: alpha
    display_name: Alpha
    category: efficient_growth
    incompatible: [beta]
    typical_success_rate: 0.5
  - name: beta
    display_name: Beta
    category: venture_hypergrowth
    incompatible: [alpha]
    typical_success_rate: 0.5
"#,
    )
    .unwrap();
    let engine = EngineBuilder::new()
        .with_library(Arc::new(library))
        .with_model(mock(ComponentId::Ensemble, 0.6))
        .build()
        .unwrap();

    let decision = engine.predict_value(&json!({"team_size": 10})).await;
    let warnings = decision.pattern_analysis.unwrap().warnings;
    assert!(
        warnings
            .iter()
            .any(|w| w.contains("alpha") && w.contains("beta") && w.contains("incompatible")),
        "warnings: {:?}",
        warnings
    );
}

#[tokio::test]
async fn observer_sees_every_request() {
    let observer = Arc::new(InMemoryObserver::new());
    let engine = EngineBuilder::new()
        .with_model(mock(ComponentId::Ensemble, 0.6))
        .with_observer(observer.clone())
        .build()
        .unwrap();

    engine.predict_value(&strong_record()).await;
    engine.predict_value(&json!({})).await;

    let observations = observer.observations();
    assert_eq!(observations.len(), 2);
    assert!(!observations[0].fallback_used);
    assert!(observations[1].fallback_used);
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let engine = Arc::new(default_engine());
    let baseline = engine.predict_value(&strong_record()).await.without_latency();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.predict_value(&strong_record()).await })
        })
        .collect();

    for handle in handles {
        let decision = handle.await.unwrap();
        assert_eq!(decision.without_latency(), baseline);
    }
    assert_eq!(engine.metrics().requests, 17);
}

#[tokio::test]
async fn predict_accepts_parsed_records() {
    let engine = default_engine();
    let record = strong_record();
    let from_record = engine.predict(record.as_object().unwrap()).await;
    let from_value = engine.predict_value(&record).await;
    assert_eq!(from_record.without_latency(), from_value.without_latency());
}

#[tokio::test]
async fn wrong_typed_values_do_not_break_prediction() {
    let engine = default_engine();
    let decision = engine
        .predict_value(&json!({
            "team_size": "sixty",
            "burn_multiple": [1, 2],
            "network_effects_present": "yes",
            "funding_stage": 7,
            "revenue_growth_rate_percent": {"nested": true}
        }))
        .await;
    assert_in_range(&decision);
}
