//! Feature predicates used by pattern definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::features::coercion::{labels_match, normalize_label};
use crate::domain::features::FeatureVector;

/// A condition over one canonical feature.
///
/// Serialized externally tagged, e.g. `{ min: 3.0 }` or `{ one_of: [saas] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Value must be at least this.
    Min(f64),
    /// Value must be at most this.
    Max(f64),
    /// Value must fall in `[low, high]`.
    Range(f64, f64),
    /// Boolean feature must equal this.
    Equals(bool),
    /// Categorical feature label must be one of these.
    OneOf(Vec<String>),
}

/// Result of evaluating one predicate against a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateOutcome {
    Met,
    Unmet,
    /// The feature was not supplied; counts as unmet.
    Unevaluable,
}

impl PredicateOutcome {
    pub fn is_met(&self) -> bool {
        matches!(self, PredicateOutcome::Met)
    }
}

impl Predicate {
    /// Evaluates against a vector. Never panics; absent features are unevaluable.
    pub fn evaluate(&self, vector: &FeatureVector, feature: &str) -> PredicateOutcome {
        if !vector.is_present(feature) {
            return PredicateOutcome::Unevaluable;
        }
        let met = match self {
            Predicate::Min(min) => vector.numeric(feature) >= *min,
            Predicate::Max(max) => vector.numeric(feature) <= *max,
            Predicate::Range(low, high) => {
                let v = vector.numeric(feature);
                v >= *low && v <= *high
            }
            Predicate::Equals(expected) => vector.flag(feature) == *expected,
            Predicate::OneOf(labels) => match vector.category(feature) {
                Some(label) => labels.iter().any(|l| labels_match(&normalize_label(l), label)),
                None => false,
            },
        };
        if met {
            PredicateOutcome::Met
        } else {
            PredicateOutcome::Unmet
        }
    }

    /// Human-readable form used in gap analysis, e.g. `burn_multiple <= 2`.
    pub fn describe(&self, feature: &str) -> String {
        format!("{} {}", feature, self)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Min(min) => write!(f, ">= {}", min),
            Predicate::Max(max) => write!(f, "<= {}", max),
            Predicate::Range(low, high) => write!(f, "in [{}, {}]", low, high),
            Predicate::Equals(expected) => write!(f, "== {}", expected),
            Predicate::OneOf(labels) => write!(f, "in {{{}}}", labels.join(", ")),
        }
    }
}
