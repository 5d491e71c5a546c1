//! Mock probability model for testing.
//!
//! # Features
//!
//! - Fixed probability with optional confidence
//! - Simulated delays for timeout testing
//! - Error injection for resilience testing
//! - Call counting for verification
//!
//! # Example
//!
//! ```ignore
//! let model = MockProbabilityModel::new(ComponentId::Temporal, 0.62)
//!     .with_confidence(0.9)
//!     .with_delay(Duration::from_millis(50));
//! ```

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::features::FeatureVector;
use crate::domain::foundation::ComponentId;
use crate::ports::{ModelError, ModelInfo, ModelOutput, ProbabilityModel};

/// Configurable stand-in for a per-axis model.
#[derive(Debug, Clone)]
pub struct MockProbabilityModel {
    component: ComponentId,
    probability: f64,
    confidence: Option<f64>,
    delay: Duration,
    error: Option<ModelError>,
    calls: Arc<AtomicUsize>,
}

impl MockProbabilityModel {
    pub fn new(component: ComponentId, probability: f64) -> Self {
        Self {
            component,
            probability,
            confidence: None,
            delay: Duration::ZERO,
            error: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A model that always fails with `error`.
    pub fn failing(component: ComponentId, error: ModelError) -> Self {
        Self::new(component, 0.5).with_error(error)
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_error(mut self, error: ModelError) -> Self {
        self.error = Some(error);
        self
    }

    /// Number of calls made to this model, across clones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProbabilityModel for MockProbabilityModel {
    fn component(&self) -> ComponentId {
        self.component
    }

    async fn predict_probability(&self, _features: &FeatureVector) -> Result<ModelOutput, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        let output = ModelOutput::new(self.probability);
        Ok(match self.confidence {
            Some(c) => output.with_confidence(c),
            None => output,
        })
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo::new(format!("mock-{}", self.component.as_str()), "mock")
    }
}
