//! Property tests: the engine is total and its outputs stay in range.

use once_cell::sync::Lazy;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::runtime::Runtime;

use venture_oracle::adapters::MockProbabilityModel;
use venture_oracle::domain::features::{FeatureVector, FEATURES};
use venture_oracle::domain::matching::{softmax, PatternMatcher};
use venture_oracle::domain::patterns::PatternLibrary;
use venture_oracle::domain::scoring::{CategoryScores, RecalibrationTable};
use venture_oracle::{ComponentId, EngineBuilder, PredictionEngine};

static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
});

static ENGINE: Lazy<PredictionEngine> = Lazy::new(|| {
    EngineBuilder::new()
        .with_model(Arc::new(MockProbabilityModel::new(ComponentId::Ensemble, 0.00005)))
        .with_model(Arc::new(MockProbabilityModel::new(ComponentId::Temporal, 0.7).with_confidence(0.9)))
        .with_model(Arc::new(MockProbabilityModel::new(ComponentId::Industry, 0.45)))
        .build()
        .unwrap()
});

static MATCHER: Lazy<PatternMatcher> =
    Lazy::new(|| PatternMatcher::new(Arc::new(PatternLibrary::builtin().unwrap())));

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1e12f64..1e12).prop_map(|f| json!(f)),
        any::<i64>().prop_map(|i| json!(i)),
        "[a-zA-Z_ ]{0,12}".prop_map(Value::String),
        prop::sample::select(vec!["seed", "series_a", "SaaS", "tier_1", "beta", "yes", "true", "N/A"])
            .prop_map(|s| json!(s)),
    ]
}

fn record() -> impl Strategy<Value = Value> {
    let mut names: Vec<String> = FEATURES.iter().map(|f| f.name.to_string()).collect();
    names.push("unrelated_field".to_string());
    let value = prop_oneof![
        4 => scalar(),
        1 => prop::collection::vec(scalar(), 0..3).prop_map(Value::Array),
    ];
    prop::collection::btree_map(prop::sample::select(names), value, 0..25)
        .prop_map(|fields| Value::Object(fields.into_iter().collect()))
}

fn any_input() -> impl Strategy<Value = Value> {
    prop_oneof![
        8 => record(),
        1 => scalar(),
        1 => prop::collection::vec(scalar(), 0..4).prop_map(Value::Array),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prediction_is_total_and_in_range(input in any_input()) {
        let decision = RUNTIME.block_on(ENGINE.predict_value(&input));
        prop_assert!((0.05..=0.95).contains(&decision.success_probability));
        prop_assert!((0.0..=1.0).contains(&decision.confidence_score));
        prop_assert!((0.0..=1.0).contains(&decision.component_agreement));
        prop_assert!(decision.key_factors.len() <= 5);
        if !decision.weights_used.is_empty() {
            let total: f64 = decision.weights_used.values().sum();
            prop_assert!((total - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn prediction_is_idempotent(input in record()) {
        let first = RUNTIME.block_on(ENGINE.predict_value(&input));
        let second = RUNTIME.block_on(ENGINE.predict_value(&input));
        prop_assert_eq!(first.without_latency(), second.without_latency());
    }

    #[test]
    fn pattern_mixture_sums_to_one(input in record()) {
        let vector = FeatureVector::from_record(input.as_object().unwrap());
        let scores = CategoryScores::from_vector(&vector);
        let analysis = MATCHER.match_patterns(&vector, &scores);
        if let Some(profile) = analysis.profile {
            let total: f64 = profile.mixture.values().sum();
            prop_assert!((total - 1.0).abs() < 1e-6);
            prop_assert!(profile.primary.confidence > 0.3);
            prop_assert!((0.0..=1.0).contains(&profile.stability));
        }
        prop_assert!((0.5..=2.0).contains(&analysis.success_modifier));
    }

    #[test]
    fn softmax_is_a_distribution(
        confidences in prop::collection::vec(0.3f64..=1.0, 1..24),
        temperature in 0.05f64..5.0,
    ) {
        let shares = softmax(&confidences, temperature);
        let total: f64 = shares.iter().sum();
        prop_assert_eq!(shares.len(), confidences.len());
        prop_assert!((total - 1.0).abs() < 1e-6);
        prop_assert!(shares.iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn recalibration_is_monotonic_within_bands(a in 0.0f64..1.0, b in 0.0f64..1.0) {
        let table = RecalibrationTable::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        if table.band_of(low) == table.band_of(high) {
            prop_assert!(table.apply(low) <= table.apply(high));
        }
        prop_assert!((0.0..=0.95).contains(&table.apply(a)));
        prop_assert_eq!(table.apply(a), table.apply(a));
    }
}
