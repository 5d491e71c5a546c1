//! In-memory observer that records every observation.
//!
//! Useful for tests and for local inspection of engine output.

use std::sync::{Mutex, PoisonError};

use crate::ports::{DecisionObservation, DecisionObserver};

/// Thread-safe recorder of observations, in arrival order.
#[derive(Debug, Default)]
pub struct InMemoryObserver {
    observations: Mutex<Vec<DecisionObservation>>,
}

impl InMemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded observations.
    pub fn observations(&self) -> Vec<DecisionObservation> {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl DecisionObserver for InMemoryObserver {
    fn observe(&self, observation: &DecisionObservation) {
        self.observations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observation.clone());
    }
}
