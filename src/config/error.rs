//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Model timeout must be between 1ms and 60000ms, got {0}ms")]
    InvalidTimeout(u64),

    #[error("{name} must be within [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    #[error("Unknown component in weight overrides: {0}")]
    UnknownComponent(String),

    #[error("Weight for {component} must be finite and non-negative, got {value}")]
    InvalidWeight { component: String, value: f64 },

    #[error("Mixture temperature must be finite and positive, got {0}")]
    InvalidTemperature(f64),

    #[error("min_active_models must be between 1 and {max}, got {value}")]
    InvalidMinActiveModels { value: usize, max: usize },

    #[error("Invalid log filter directive: {0}")]
    InvalidLogLevel(String),
}
