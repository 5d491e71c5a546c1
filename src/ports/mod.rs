//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the scoring domain and the outside world. Adapters implement these ports.
//!
//! - `ProbabilityModel` - Per-axis success models (async, timeout-wrapped by the caller)
//! - `BinaryClassifier` - Pre-trained pattern and category classifiers
//! - `DecisionObserver` - Passive monitoring of produced decisions

mod binary_classifier;
mod decision_observer;
mod probability_model;

pub use binary_classifier::{BinaryClassifier, ClassifierError};
pub use decision_observer::{DecisionObservation, DecisionObserver, NoOpObserver};
pub use probability_model::{ModelError, ModelInfo, ModelOutput, ProbabilityModel};
