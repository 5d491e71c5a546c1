//! Heuristic fallback used when the numeric pipeline cannot run.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::features::FeatureVector;

use super::{pillar_factors, CategoryScores, QualityBlend, Verdict};

/// Lowest fallback confidence (nothing supplied).
pub const FALLBACK_MIN_CONFIDENCE: f64 = 0.5;
/// Confidence gained from full feature coverage.
pub const FALLBACK_COVERAGE_GAIN: f64 = 0.4;

/// Why the heuristic path ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackReason {
    /// The input could not be projected onto the feature contract.
    FeaturePreparation { message: String },
    /// Too few per-axis models produced a usable prediction.
    ModelsUnavailable { active: usize, required: usize },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::FeaturePreparation { message } => {
                write!(f, "feature preparation failed: {}", message)
            }
            FallbackReason::ModelsUnavailable { active, required } => {
                write!(f, "{} of {} required models available", active, required)
            }
        }
    }
}

/// Best-effort assessment from pillar scores alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackAssessment {
    pub probability: f64,
    pub confidence: f64,
    pub verdict: Verdict,
    pub category_scores: CategoryScores,
    pub risk_factors: Vec<String>,
    pub success_factors: Vec<String>,
}

impl FallbackAssessment {
    /// Assesses whatever features are present. Never fails.
    ///
    /// Probability is the mean pillar score (0.5 with no signal), clamped to
    /// the blend range. Confidence grows with feature coverage from 0.5 to 0.9.
    pub fn assess(vector: &FeatureVector, blend: &QualityBlend) -> Self {
        let category_scores = CategoryScores::from_vector(vector);
        let probability = blend.clamp(category_scores.mean_fraction());
        let confidence =
            (FALLBACK_MIN_CONFIDENCE + FALLBACK_COVERAGE_GAIN * vector.coverage()).clamp(0.5, 0.9);
        let (risk_factors, success_factors) = pillar_factors(&category_scores);
        Self {
            probability,
            confidence,
            verdict: Verdict::fallback(probability),
            category_scores,
            risk_factors,
            success_factors,
        }
    }
}
