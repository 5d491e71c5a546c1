//! ProbabilityModel port - Interface for the per-axis prediction models.
//!
//! Each external model (scoring ensemble, temporal trend, sector) is exposed
//! only as "predict a success probability for this feature vector". Training
//! happens elsewhere; this crate consumes the trained artifact.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct ConstantModel;
//!
//! #[async_trait]
//! impl ProbabilityModel for ConstantModel {
//!     fn component(&self) -> ComponentId {
//!         ComponentId::Temporal
//!     }
//!
//!     async fn predict_probability(&self, _: &FeatureVector) -> Result<ModelOutput, ModelError> {
//!         Ok(ModelOutput::new(0.61))
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::features::FeatureVector;
use crate::domain::foundation::ComponentId;

/// Port for a per-axis success-probability model.
///
/// Implementations must be safe to share across concurrent requests and
/// must not hold per-request state.
#[async_trait]
pub trait ProbabilityModel: Send + Sync {
    /// Which ensemble slot this model fills.
    fn component(&self) -> ComponentId;

    /// Predicts the success probability for one entity.
    ///
    /// The caller wraps this in a timeout; implementations need not enforce one.
    async fn predict_probability(&self, features: &FeatureVector) -> Result<ModelOutput, ModelError>;

    /// Model name and version for audit output.
    fn model_info(&self) -> ModelInfo {
        ModelInfo::new(self.component().as_str(), "unversioned")
    }
}

/// Output of a single model call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    /// Success probability, expected in [0, 1].
    pub probability: f64,
    /// Self-reported confidence in [0, 1], if the model provides one.
    pub confidence: Option<f64>,
}

impl ModelOutput {
    /// Creates an output without a confidence estimate.
    pub fn new(probability: f64) -> Self {
        Self {
            probability,
            confidence: None,
        }
    }

    /// Attaches a confidence estimate.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Checks the output is usable.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidOutput` for a non-finite or out-of-range
    /// probability. A bad confidence is dropped rather than rejected.
    pub fn validated(self) -> Result<Self, ModelError> {
        if !self.probability.is_finite() || !(0.0..=1.0).contains(&self.probability) {
            return Err(ModelError::InvalidOutput {
                value: self.probability,
            });
        }
        let confidence = self
            .confidence
            .filter(|c| c.is_finite() && (0.0..=1.0).contains(c));
        Ok(Self {
            probability: self.probability,
            confidence,
        })
    }
}

/// Name and version of a model, for audit output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Why a component could not contribute.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// The call exceeded the caller-supplied timeout.
    #[error("model timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The model is not loaded or not reachable.
    #[error("model unavailable: {message}")]
    Unavailable { message: String },

    /// The model ran but failed.
    #[error("model failed: {0}")]
    Failed(String),

    /// The model returned something that is not a probability.
    #[error("model returned invalid probability {value}")]
    InvalidOutput { value: f64 },
}

impl ModelError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a failure error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Short machine-readable kind, for logs and audit metadata.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelError::Timeout { .. } => "timeout",
            ModelError::Unavailable { .. } => "unavailable",
            ModelError::Failed(_) => "failed",
            ModelError::InvalidOutput { .. } => "invalid_output",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validated_accepts_probabilities() {
        let out = ModelOutput::new(0.3).with_confidence(0.8).validated().unwrap();
        assert_eq!(out.probability, 0.3);
        assert_eq!(out.confidence, Some(0.8));
    }

    #[test]
    fn validated_rejects_out_of_range() {
        assert_eq!(
            ModelOutput::new(1.2).validated(),
            Err(ModelError::InvalidOutput { value: 1.2 })
        );
        assert!(ModelOutput::new(f64::NAN).validated().is_err());
    }

    #[test]
    fn validated_drops_bad_confidence() {
        let out = ModelOutput::new(0.4).with_confidence(3.0).validated().unwrap();
        assert_eq!(out.confidence, None);
    }

    #[test]
    fn error_kinds() {
        assert_eq!(ModelError::Timeout { timeout_ms: 5 }.kind(), "timeout");
        assert_eq!(ModelError::unavailable("x").kind(), "unavailable");
        assert_eq!(ModelError::failed("x").kind(), "failed");
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ModelError::Timeout { timeout_ms: 250 }.to_string(),
            "model timed out after 250ms"
        );
    }
}
