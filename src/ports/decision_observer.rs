//! DecisionObserver port - passive monitoring of engine output.
//!
//! Observers see every decision after it is assembled. They cannot alter it
//! and their failures never affect the caller.

use serde::{Deserialize, Serialize};

use crate::domain::decision::{DecisionObject, Verdict};

/// The slice of a decision a monitoring collaborator cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionObservation {
    pub probability: f64,
    pub confidence: f64,
    pub verdict: Verdict,
    pub latency_ms: u64,
    pub models_used: usize,
    pub fallback_used: bool,
}

impl From<&DecisionObject> for DecisionObservation {
    fn from(decision: &DecisionObject) -> Self {
        Self {
            probability: decision.success_probability,
            confidence: decision.confidence_score,
            verdict: decision.verdict,
            latency_ms: decision.metadata.latency_ms,
            models_used: decision.metadata.models_used.len(),
            fallback_used: decision.metadata.fallback_used,
        }
    }
}

/// Port for passive decision monitoring.
pub trait DecisionObserver: Send + Sync {
    /// Called once per completed request.
    fn observe(&self, observation: &DecisionObservation);
}

/// Observer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl DecisionObserver for NoOpObserver {
    fn observe(&self, _observation: &DecisionObservation) {}
}
