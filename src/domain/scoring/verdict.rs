//! Verdict bands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Final categorical decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "STRONG PASS")]
    StrongPass,
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "CONDITIONAL PASS")]
    ConditionalPass,
    #[serde(rename = "CONDITIONAL FAIL")]
    ConditionalFail,
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "STRONG FAIL")]
    StrongFail,
    #[serde(rename = "NEEDS_MORE_DATA")]
    NeedsMoreData,
    #[serde(rename = "ERROR")]
    Error,
}

impl Verdict {
    /// Six-band verdict for a blended probability, overridden to
    /// `NeedsMoreData` when confidence is below `confidence_threshold`.
    pub fn from_probability(probability: f64, confidence: f64, confidence_threshold: f64) -> Self {
        if confidence < confidence_threshold {
            return Verdict::NeedsMoreData;
        }
        if probability >= 0.80 {
            Verdict::StrongPass
        } else if probability >= 0.65 {
            Verdict::Pass
        } else if probability >= 0.50 {
            Verdict::ConditionalPass
        } else if probability >= 0.35 {
            Verdict::ConditionalFail
        } else if probability >= 0.20 {
            Verdict::Fail
        } else {
            Verdict::StrongFail
        }
    }

    /// Coarse three-band verdict used by the heuristic fallback.
    pub fn fallback(probability: f64) -> Self {
        if probability >= 0.60 {
            Verdict::Pass
        } else if probability >= 0.45 {
            Verdict::ConditionalPass
        } else {
            Verdict::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::StrongPass => "STRONG PASS",
            Verdict::Pass => "PASS",
            Verdict::ConditionalPass => "CONDITIONAL PASS",
            Verdict::ConditionalFail => "CONDITIONAL FAIL",
            Verdict::Fail => "FAIL",
            Verdict::StrongFail => "STRONG FAIL",
            Verdict::NeedsMoreData => "NEEDS_MORE_DATA",
            Verdict::Error => "ERROR",
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, Verdict::StrongPass | Verdict::Pass | Verdict::ConditionalPass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
