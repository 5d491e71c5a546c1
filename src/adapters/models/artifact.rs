//! Loading of trained model artifacts from JSON.
//!
//! A classifier directory holds a `manifest.json` naming the category gates
//! and per-pattern models, each stored in its own JSON file:
//!
//! ```json
//! {
//!   "version": "2024.3",
//!   "gates": [{ "category": "deep_tech", "path": "gates/deep_tech.json" }],
//!   "patterns": [{ "pattern": "ai_ml_core", "path": "patterns/ai_ml_core.json", "threshold": 0.42 }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::classification::{HierarchicalClassifier, PatternModel, ScoredModel, StandardScaler, DEFAULT_THRESHOLD};
use crate::domain::features::encoded_names;
use crate::domain::patterns::{MasterCategory, PatternLibrary};
use crate::ports::BinaryClassifier;

use super::{LogisticModel, TreeEnsembleModel};

/// Name of the manifest inside a classifier directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Errors raised while loading artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// The model family stored in an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    Logistic(LogisticModel),
    TreeEnsemble(TreeEnsembleModel),
}

impl ClassifierArtifact {
    pub fn into_classifier(self) -> Arc<dyn BinaryClassifier> {
        match self {
            ClassifierArtifact::Logistic(m) => Arc::new(m),
            ClassifierArtifact::TreeEnsemble(m) => Arc::new(m),
        }
    }
}

/// One trained model with its input columns and optional scaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Encoded column names; defaults to the full encoded contract.
    #[serde(default)]
    pub features: Option<Vec<String>>,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    pub model: ClassifierArtifact,
}

impl ModelArtifact {
    /// Reads and validates one artifact file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let artifact: ModelArtifact = read_json(path)?;
        artifact.validate(path)?;
        Ok(artifact)
    }

    fn validate(&self, path: &Path) -> Result<(), ArtifactError> {
        let invalid = |reason: String| ArtifactError::Invalid {
            path: path.to_path_buf(),
            reason,
        };
        let width = self.columns().len();
        if let Some(scaler) = &self.scaler {
            if scaler.width() != width || scaler.scale.len() != width {
                return Err(invalid(format!(
                    "scaler width {} does not match {} input columns",
                    scaler.width(),
                    width
                )));
            }
        }
        if let ClassifierArtifact::Logistic(m) = &self.model {
            if m.coefficients.len() != width {
                return Err(invalid(format!(
                    "{} coefficients for {} input columns",
                    m.coefficients.len(),
                    width
                )));
            }
        }
        Ok(())
    }

    /// Input columns in order.
    pub fn columns(&self) -> Vec<String> {
        self.features
            .clone()
            .unwrap_or_else(|| encoded_names().to_vec())
    }

    /// Binds the artifact to its columns and scaler.
    pub fn into_scored_model(self) -> ScoredModel {
        let columns = self.columns();
        let model = ScoredModel::new(columns, self.model.into_classifier());
        match self.scaler {
            Some(scaler) => model.with_scaler(scaler),
            None => model,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GateEntry {
    category: MasterCategory,
    path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
struct PatternEntry {
    pattern: String,
    path: PathBuf,
    #[serde(default = "default_threshold")]
    threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

#[derive(Debug, Clone, Deserialize)]
struct Manifest {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    gates: Vec<GateEntry>,
    #[serde(default)]
    patterns: Vec<PatternEntry>,
}

/// Loads a hierarchical classifier from a directory.
///
/// A missing or unreadable manifest is an error. Individual gate and pattern
/// models that fail to load are logged and skipped.
pub fn load_classifier_dir(
    dir: impl AsRef<Path>,
    library: Arc<PatternLibrary>,
    gate_threshold: f64,
) -> Result<HierarchicalClassifier, ArtifactError> {
    let dir = dir.as_ref();
    let manifest: Manifest = read_json(&dir.join(MANIFEST_FILE))?;

    let mut classifier = HierarchicalClassifier::new(library.clone()).with_gate_threshold(gate_threshold);

    for gate in manifest.gates {
        match ModelArtifact::load(dir.join(&gate.path)) {
            Ok(artifact) => {
                classifier = classifier.with_gate(gate.category, artifact.into_scored_model());
            }
            Err(e) => warn!(category = gate.category.as_str(), error = %e, "Skipping category gate"),
        }
    }

    for entry in manifest.patterns {
        if library.get(&entry.pattern).is_none() {
            warn!(pattern = %entry.pattern, "Skipping classifier for undeclared pattern");
            continue;
        }
        if !(0.0..=1.0).contains(&entry.threshold) {
            warn!(pattern = %entry.pattern, threshold = entry.threshold, "Skipping classifier with invalid threshold");
            continue;
        }
        match ModelArtifact::load(dir.join(&entry.path)) {
            Ok(artifact) => {
                classifier = classifier.with_pattern(
                    entry.pattern,
                    PatternModel {
                        model: artifact.into_scored_model(),
                        threshold: entry.threshold,
                    },
                );
            }
            Err(e) => warn!(pattern = %entry.pattern, error = %e, "Skipping pattern classifier"),
        }
    }

    info!(
        dir = %dir.display(),
        version = manifest.version.as_deref().unwrap_or("unversioned"),
        gates = classifier.gate_count(),
        patterns = classifier.pattern_model_count(),
        "Loaded pattern classifiers"
    );
    Ok(classifier)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::features::FeatureVector;
    use serde_json::json;
    use std::fs;

    fn write(dir: &Path, name: &str, value: serde_json::Value) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, serde_json::to_string(&value).unwrap()).unwrap();
    }

    fn logistic(intercept: f64) -> serde_json::Value {
        json!({
            "features": ["team_size"],
            "model": {"family": "logistic", "coefficients": [0.0], "intercept": intercept}
        })
    }

    #[test]
    fn loads_manifest_and_skips_broken_entries() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "patterns/good.json", logistic(3.0));
        fs::write(dir.path().join("patterns/broken.json"), "{not json").unwrap();
        write(
            dir.path(),
            MANIFEST_FILE,
            json!({
                "version": "test",
                "gates": [{"category": "deep_tech", "path": "gates/missing.json"}],
                "patterns": [
                    {"pattern": "ai_ml_core", "path": "patterns/good.json", "threshold": 0.6},
                    {"pattern": "blitzscaler", "path": "patterns/broken.json"},
                    {"pattern": "not_declared", "path": "patterns/good.json"}
                ]
            }),
        );

        let library = Arc::new(PatternLibrary::builtin().unwrap());
        let classifier = load_classifier_dir(dir.path(), library, 0.3).unwrap();
        assert_eq!(classifier.pattern_model_count(), 1);
        assert_eq!(classifier.gate_count(), 0);
        assert!(classifier.covers("ai_ml_core"));

        let v = FeatureVector::from_record(json!({"team_size": 4}).as_object().unwrap());
        let matches = classifier.classify(&v);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].threshold, 0.6);
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let library = Arc::new(PatternLibrary::builtin().unwrap());
        assert!(matches!(
            load_classifier_dir(dir.path(), library, 0.3),
            Err(ArtifactError::Io { .. })
        ));
    }

    #[test]
    fn mismatched_scaler_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "model.json",
            json!({
                "features": ["team_size", "burn_multiple"],
                "scaler": {"mean": [0.0], "scale": [1.0]},
                "model": {"family": "logistic", "coefficients": [1.0, 1.0]}
            }),
        );
        assert!(matches!(
            ModelArtifact::load(dir.path().join("model.json")),
            Err(ArtifactError::Invalid { .. })
        ));
    }

    #[test]
    fn full_contract_is_default_input() {
        let artifact: ModelArtifact = serde_json::from_value(json!({
            "model": {"family": "tree_ensemble", "aggregation": {"kind": "bagged"},
                      "trees": [{"nodes": [{"leaf": {"value": 0.3}}]}]}
        }))
        .unwrap();
        assert_eq!(artifact.columns().len(), encoded_names().len());
    }
}
