//! venture-oracle - score one startup record from the command line.
//!
//! Usage: `venture-oracle [FILE]`. Reads a JSON object from `FILE`, or from
//! stdin when no file (or `-`) is given, and prints the decision as JSON.
//! Logs go to stderr so stdout stays machine-readable.

use serde_json::Value;
use std::io::{self, Read};
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*};

use venture_oracle::adapters::{MockProbabilityModel, TracingObserver};
use venture_oracle::config::LoggingConfig;
use venture_oracle::{AppConfig, ComponentId, EngineBuildError, EngineBuilder};

/// Probability reported by stand-in models for unconfigured axes.
const MOCK_PROBABILITY: f64 = 0.5;

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    #[error("input is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Build(#[from] EngineBuildError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load_validated() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging);

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "venture-oracle failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &AppConfig) -> Result<(), CliError> {
    let input = read_input(std::env::args().nth(1))?;
    let value: Value = serde_json::from_str(&input)?;

    let mut builder = EngineBuilder::from_config(config)?.with_observer(Arc::new(TracingObserver));
    for component in ComponentId::model_axes() {
        if !builder.has_model(*component) {
            warn!(component = component.as_str(), "No model artifact configured, using mock model");
            builder = builder.with_model(Arc::new(MockProbabilityModel::new(*component, MOCK_PROBABILITY)));
        }
    }
    let engine = builder.build()?;

    let decision = engine.predict_value(&value).await;
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

fn read_input(path: Option<String>) -> io::Result<String> {
    match path.as_deref() {
        None | Some("-") => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        Some(path) => std::fs::read_to_string(path),
    }
}

fn init_tracing(config: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(config.env_filter());
    if config.json {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(io::stderr))
            .init();
    }
}
