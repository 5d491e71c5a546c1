//! Probability value object (0.0-1.0 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A probability between 0.0 and 1.0 inclusive.
///
/// Non-finite inputs collapse to [`Probability::NEUTRAL`] so that a
/// misbehaving model can never push NaN into a weighted combination.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Probability(f64);

impl Probability {
    /// Zero probability.
    pub const ZERO: Self = Self(0.0);

    /// Certainty.
    pub const ONE: Self = Self(1.0);

    /// The neutral value substituted for unavailable components.
    pub const NEUTRAL: Self = Self(0.5);

    /// Creates a new Probability, clamping to the valid range.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self::NEUTRAL
        }
    }

    /// Creates a Probability, returning error if out of range or not finite.
    pub fn try_new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::out_of_range("probability", 0.0, 1.0, value));
        }
        Ok(Self(value))
    }

    /// Returns the raw value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Distance from the decision boundary, rescaled to 0.0-1.0.
    pub fn decisiveness(&self) -> f64 {
        (self.0 - 0.5).abs() * 2.0
    }
}

impl Default for Probability {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0 * 100.0)
    }
}

impl From<Probability> for f64 {
    fn from(p: Probability) -> Self {
        p.0
    }
}
