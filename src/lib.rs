//! Venture Oracle - calibrated startup success scoring.
//!
//! This crate combines several per-axis success models with a structured
//! business-pattern analysis into one calibrated probability, a verdict and
//! an auditable explanation.
//!
//! ```ignore
//! let engine = EngineBuilder::new()
//!     .with_model(Arc::new(MockProbabilityModel::new(ComponentId::Ensemble, 0.62)))
//!     .build()?;
//! let decision = engine.predict_value(&serde_json::json!({"revenue_growth_rate_percent": 140})).await;
//! println!("{} {:.2}", decision.verdict, decision.success_probability);
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{EngineBuildError, EngineBuilder, EngineSettings, PredictionEngine};
pub use config::AppConfig;
pub use domain::decision::{DecisionObject, Verdict};
pub use domain::foundation::ComponentId;
