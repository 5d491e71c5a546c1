//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `VENTURE_ORACLE` prefix and nested values use double underscores as separators.
//! Every section has defaults, so an empty environment yields a working engine.
//!
//! # Example
//!
//! ```no_run
//! use venture_oracle::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Model timeout: {:?}", config.orchestrator.model_timeout());
//! ```

mod error;
mod logging;
mod orchestrator;
mod patterns;

pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use orchestrator::OrchestratorConfig;
pub use patterns::PatternsConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Ensemble combination (timeouts, thresholds, weights, model artifacts)
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Pattern library and classifier settings
    #[serde(default)]
    pub patterns: PatternsConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `VENTURE_ORACLE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `VENTURE_ORACLE__ORCHESTRATOR__MODEL_TIMEOUT_MS=250` -> `orchestrator.model_timeout_ms = 250`
    /// - `VENTURE_ORACLE__ORCHESTRATOR__WEIGHTS__ENSEMBLE=0.5` -> `orchestrator.weights.ensemble = 0.5`
    /// - `VENTURE_ORACLE__PATTERNS__CLASSIFIER_DIR=/models/patterns`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("VENTURE_ORACLE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load and validate in one step
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// - Model timeout within (0, 60s]
    /// - Thresholds within [0, 1]
    /// - Weight overrides name known components and are non-negative
    /// - Log directive parses
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.orchestrator.validate()?;
        self.patterns.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
