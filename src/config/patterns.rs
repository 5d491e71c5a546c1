//! Pattern subsystem configuration

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::matching::MatcherSettings;

use super::error::ValidationError;
use super::orchestrator::check_unit;

/// Pattern library and classifier settings
#[derive(Debug, Clone, Deserialize)]
pub struct PatternsConfig {
    /// YAML catalog overriding the built-in library
    pub library_path: Option<PathBuf>,

    /// Directory holding `manifest.json` and classifier artifacts
    pub classifier_dir: Option<PathBuf>,

    /// Softmax temperature for the pattern mixture
    #[serde(default = "default_mixture_temperature")]
    pub mixture_temperature: f64,

    /// Category gates below this skip their patterns
    #[serde(default = "default_gate_threshold")]
    pub gate_threshold: f64,

    /// Patterns must score above this to be retained
    #[serde(default = "default_candidate_threshold")]
    pub candidate_threshold: f64,
}

impl PatternsConfig {
    /// Matcher settings derived from this section
    pub fn matcher_settings(&self) -> MatcherSettings {
        MatcherSettings {
            candidate_threshold: self.candidate_threshold,
            mixture_temperature: self.mixture_temperature,
        }
    }

    /// Validate pattern configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.mixture_temperature.is_finite() || self.mixture_temperature <= 0.0 {
            return Err(ValidationError::InvalidTemperature(self.mixture_temperature));
        }
        check_unit("gate_threshold", self.gate_threshold)?;
        check_unit("candidate_threshold", self.candidate_threshold)?;
        Ok(())
    }
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            classifier_dir: None,
            mixture_temperature: default_mixture_temperature(),
            gate_threshold: default_gate_threshold(),
            candidate_threshold: default_candidate_threshold(),
        }
    }
}

fn default_mixture_temperature() -> f64 {
    1.0
}

fn default_gate_threshold() -> f64 {
    0.3
}

fn default_candidate_threshold() -> f64 {
    0.3
}
