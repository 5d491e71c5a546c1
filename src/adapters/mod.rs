//! Adapters - Implementations of port interfaces.
//!
//! - `models` - Trained-artifact classifiers, per-axis models and mocks
//! - `observers` - Decision observers (tracing, in-memory)

pub mod models;
pub mod observers;

pub use models::{
    load_classifier_dir, ArtifactError, ArtifactProbabilityModel, LogisticModel, MockProbabilityModel,
    TreeEnsembleModel,
};
pub use observers::{InMemoryObserver, TracingObserver};
