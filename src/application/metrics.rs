//! In-process engine counters.
//!
//! Counters are best-effort and never feed back into a decision.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ports::ModelError;

/// Atomic request and failure counters shared by every request.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    requests: AtomicU64,
    fallbacks: AtomicU64,
    errors: AtomicU64,
    model_failures: AtomicU64,
    model_timeouts: AtomicU64,
}

/// Point-in-time copy of [`EngineMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub fallbacks: u64,
    pub errors: u64,
    pub model_failures: u64,
    pub model_timeouts: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Timeouts are counted both as failures and separately.
    pub(crate) fn record_model_failure(&self, error: &ModelError) {
        self.model_failures.fetch_add(1, Ordering::Relaxed);
        if matches!(error, ModelError::Timeout { .. }) {
            self.model_timeouts.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            model_failures: self.model_failures.load(Ordering::Relaxed),
            model_timeouts: self.model_timeouts.load(Ordering::Relaxed),
        }
    }
}
