//! Application layer - request orchestration.
//!
//! This layer coordinates the domain scoring steps and the ports. It owns no
//! business rules of its own beyond ordering and failure routing.
//!
//! - `PredictionEngine` - runs one prediction request end to end
//! - `EngineBuilder` - loads artifacts once and assembles an engine
//! - `EngineMetrics` - atomic request and failure counters

mod builder;
mod engine;
mod metrics;

pub use builder::{EngineBuildError, EngineBuilder};
pub use engine::{EngineSettings, PredictionEngine};
pub use metrics::{EngineMetrics, MetricsSnapshot};
