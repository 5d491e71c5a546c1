//! ComponentId enum naming the signals the orchestrator combines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The components whose probabilities feed the final decision.
///
/// Ordering is canonical and drives the iteration order of every
/// `BTreeMap<ComponentId, _>` in a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentId {
    /// General scoring ensemble.
    Ensemble,
    /// Temporal-trend model.
    Temporal,
    /// Sector model.
    Industry,
    /// Structured business-pattern matcher.
    Pattern,
}

impl ComponentId {
    /// Returns all components in canonical order.
    pub fn all() -> &'static [ComponentId] {
        &[
            ComponentId::Ensemble,
            ComponentId::Temporal,
            ComponentId::Industry,
            ComponentId::Pattern,
        ]
    }

    /// Returns the per-axis model components (everything but the pattern subsystem).
    pub fn model_axes() -> &'static [ComponentId] {
        &[ComponentId::Ensemble, ComponentId::Temporal, ComponentId::Industry]
    }

    /// Returns true if this component is an external per-axis model.
    pub fn is_model_axis(&self) -> bool {
        !matches!(self, ComponentId::Pattern)
    }

    /// Static weight before confidence adjustment and renormalization.
    pub fn default_weight(&self) -> f64 {
        match self {
            ComponentId::Ensemble => 0.40,
            ComponentId::Temporal => 0.20,
            ComponentId::Industry => 0.15,
            ComponentId::Pattern => 0.25,
        }
    }

    /// Returns the snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentId::Ensemble => "ensemble",
            ComponentId::Temporal => "temporal",
            ComponentId::Industry => "industry",
            ComponentId::Pattern => "pattern",
        }
    }

    /// Parses a snake_case identifier, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        Self::all().iter().copied().find(|c| c.as_str() == raw)
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ComponentId::Ensemble => "Scoring ensemble",
            ComponentId::Temporal => "Temporal trend model",
            ComponentId::Industry => "Sector model",
            ComponentId::Pattern => "Pattern analysis",
        }
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
