//! Observer that emits each decision as a structured log event.

use tracing::{info, warn};

use crate::ports::{DecisionObservation, DecisionObserver};

/// Logs every observation at `info`, or `warn` when the fallback ran.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DecisionObserver for TracingObserver {
    fn observe(&self, observation: &DecisionObservation) {
        if observation.fallback_used {
            warn!(
                probability = observation.probability,
                confidence = observation.confidence,
                verdict = %observation.verdict,
                latency_ms = observation.latency_ms,
                models_used = observation.models_used,
                "Decision produced by fallback"
            );
        } else {
            info!(
                probability = observation.probability,
                confidence = observation.confidence,
                verdict = %observation.verdict,
                latency_ms = observation.latency_ms,
                models_used = observation.models_used,
                "Decision produced"
            );
        }
    }
}
