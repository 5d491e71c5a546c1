//! Per-request match results and their aggregate profile.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::patterns::{MasterCategory, Tag};

/// Confidence at or above which a match is primary.
pub const PRIMARY_CONFIDENCE: f64 = 0.75;
/// Confidence at or above which a match is secondary.
pub const SECONDARY_CONFIDENCE: f64 = 0.5;
/// Mixture entries below this share are hidden from display.
pub const MIXTURE_DISPLAY_FLOOR: f64 = 0.01;

/// Strength class of a single pattern match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Primary,
    Secondary,
    Potential,
}

impl MatchType {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= PRIMARY_CONFIDENCE {
            MatchType::Primary
        } else if confidence >= SECONDARY_CONFIDENCE {
            MatchType::Secondary
        } else {
            MatchType::Potential
        }
    }
}

/// The sub-scores that produced a match confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchScores {
    pub band: f64,
    pub rule: f64,
    /// Present only when a learned profile exists for the pattern.
    pub statistical: Option<f64>,
    /// Classifier probability, when a classifier covers the pattern.
    pub classifier: Option<f64>,
}

/// Result of matching one pattern against one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern: String,
    pub category: MasterCategory,
    pub confidence: f64,
    pub match_type: MatchType,
    pub scores: MatchScores,
    /// Unmet requirements and missing data, human readable.
    pub gaps: Vec<String>,
}

impl PatternMatch {
    /// Creates a match, deriving the match type from the confidence.
    pub fn new(
        pattern: impl Into<String>,
        category: MasterCategory,
        confidence: f64,
        scores: MatchScores,
    ) -> Self {
        let confidence = if confidence.is_finite() { confidence.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            pattern: pattern.into(),
            category,
            confidence,
            match_type: MatchType::from_confidence(confidence),
            scores,
            gaps: Vec::new(),
        }
    }

    pub fn with_gaps(mut self, gaps: Vec<String>) -> Self {
        self.gaps = gaps;
        self
    }
}

/// A predicted next pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionPrediction {
    pub pattern: String,
    pub probability: f64,
}

/// Aggregate over all retained matches for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternProfile {
    pub primary: PatternMatch,
    /// Remaining candidates, strongest first.
    pub secondary: Vec<PatternMatch>,
    /// Softmax over every candidate; sums to 1.
    pub mixture: BTreeMap<String, f64>,
    pub tags: Vec<Tag>,
    pub evolution: Vec<EvolutionPrediction>,
    pub stability: f64,
    pub uniqueness: f64,
}

impl PatternProfile {
    /// Mixture entries worth showing, i.e. at least 1%.
    pub fn display_mixture(&self) -> BTreeMap<String, f64> {
        self.mixture
            .iter()
            .filter(|(_, share)| **share >= MIXTURE_DISPLAY_FLOOR)
            .map(|(name, share)| (name.clone(), *share))
            .collect()
    }
}

/// Full matcher output for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternAnalysis {
    /// `None` when no pattern cleared the candidate threshold.
    pub profile: Option<PatternProfile>,
    /// Tags are evaluated even when no pattern is retained.
    pub tags: Vec<Tag>,
    pub warnings: Vec<String>,
    /// Multiplier in [0.5, 2.0] consumed by the orchestrator; 1.0 without a primary.
    pub success_modifier: f64,
}

impl PatternAnalysis {
    pub fn primary(&self) -> Option<&PatternMatch> {
        self.profile.as_ref().map(|p| &p.primary)
    }

    pub fn has_candidates(&self) -> bool {
        self.profile.is_some()
    }
}

/// `(primary - runner_up) / primary`, clamped to [0, 1]; 1.0 without a runner-up.
pub fn stability(primary: f64, runner_up: Option<f64>) -> f64 {
    match runner_up {
        None => 1.0,
        Some(_) if primary <= 0.0 => 0.0,
        Some(second) => ((primary - second) / primary).clamp(0.0, 1.0),
    }
}

/// Discretized count of strong (>= 0.5) candidates.
pub fn uniqueness(strong_matches: usize) -> f64 {
    match strong_matches {
        0 | 1 => 1.0,
        2 | 3 => 0.7,
        _ => 0.4,
    }
}

/// Numerically stable softmax over confidences.
///
/// A non-positive or non-finite temperature is treated as 1.0.
pub fn softmax(confidences: &[f64], temperature: f64) -> Vec<f64> {
    if confidences.is_empty() {
        return Vec::new();
    }
    let t = if temperature.is_finite() && temperature > 0.0 { temperature } else { 1.0 };
    let max = confidences.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = confidences.iter().map(|c| ((c - max) / t).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// `(typical_success_rate / 0.5) * (0.5 + confidence * stability)`, clamped to [0.5, 2.0].
pub fn success_modifier(typical_success_rate: f64, confidence: f64, stability: f64) -> f64 {
    let modifier = (typical_success_rate / 0.5) * (0.5 + confidence * stability);
    if modifier.is_finite() {
        modifier.clamp(0.5, 2.0)
    } else {
        1.0
    }
}
