//! Orchestrator configuration

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::foundation::ComponentId;

use super::error::ValidationError;

/// Upper bound for any per-model timeout.
const MAX_TIMEOUT_MS: u64 = 60_000;

/// Ensemble combination settings
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Timeout applied to every per-axis model call
    #[serde(default = "default_model_timeout_ms")]
    pub model_timeout_ms: u64,

    /// Confidence below which the verdict becomes NEEDS_MORE_DATA
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Confidence assumed for models that do not report one
    #[serde(default = "default_model_confidence")]
    pub default_model_confidence: f64,

    /// Per-axis successes required to skip the fallback
    #[serde(default = "default_min_active_models")]
    pub min_active_models: usize,

    /// Base weight overrides keyed by component name
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,

    /// Artifact for the scoring ensemble
    pub ensemble_model_path: Option<PathBuf>,

    /// Artifact for the temporal-trend model
    pub temporal_model_path: Option<PathBuf>,

    /// Artifact for the sector model
    pub industry_model_path: Option<PathBuf>,
}

impl OrchestratorConfig {
    /// Get model timeout as Duration
    pub fn model_timeout(&self) -> Duration {
        Duration::from_millis(self.model_timeout_ms)
    }

    /// Weight overrides parsed into component ids
    pub fn weight_overrides(&self) -> Result<BTreeMap<ComponentId, f64>, ValidationError> {
        self.weights
            .iter()
            .map(|(name, weight)| {
                let component = ComponentId::parse(name)
                    .ok_or_else(|| ValidationError::UnknownComponent(name.clone()))?;
                if !weight.is_finite() || *weight < 0.0 {
                    return Err(ValidationError::InvalidWeight {
                        component: name.clone(),
                        value: *weight,
                    });
                }
                Ok((component, *weight))
            })
            .collect()
    }

    /// Artifact path configured for a per-axis component
    pub fn model_path(&self, component: ComponentId) -> Option<&PathBuf> {
        match component {
            ComponentId::Ensemble => self.ensemble_model_path.as_ref(),
            ComponentId::Temporal => self.temporal_model_path.as_ref(),
            ComponentId::Industry => self.industry_model_path.as_ref(),
            ComponentId::Pattern => None,
        }
    }

    /// Validate orchestrator configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.model_timeout_ms == 0 || self.model_timeout_ms > MAX_TIMEOUT_MS {
            return Err(ValidationError::InvalidTimeout(self.model_timeout_ms));
        }
        check_unit("confidence_threshold", self.confidence_threshold)?;
        check_unit("default_model_confidence", self.default_model_confidence)?;

        let max = ComponentId::model_axes().len();
        if self.min_active_models == 0 || self.min_active_models > max {
            return Err(ValidationError::InvalidMinActiveModels {
                value: self.min_active_models,
                max,
            });
        }

        self.weight_overrides()?;
        Ok(())
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            model_timeout_ms: default_model_timeout_ms(),
            confidence_threshold: default_confidence_threshold(),
            default_model_confidence: default_model_confidence(),
            min_active_models: default_min_active_models(),
            weights: BTreeMap::new(),
            ensemble_model_path: None,
            temporal_model_path: None,
            industry_model_path: None,
        }
    }
}

pub(super) fn check_unit(name: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::ThresholdOutOfRange { name, value })
    }
}

fn default_model_timeout_ms() -> u64 {
    2000
}

fn default_confidence_threshold() -> f64 {
    0.65
}

fn default_model_confidence() -> f64 {
    0.7
}

fn default_min_active_models() -> usize {
    1
}
