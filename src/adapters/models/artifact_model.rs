//! Artifact-backed per-axis probability model.

use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::domain::classification::ScoredModel;
use crate::domain::features::FeatureVector;
use crate::domain::foundation::ComponentId;
use crate::ports::{ModelError, ModelInfo, ModelOutput, ProbabilityModel};

use super::{ArtifactError, ModelArtifact};

/// A trained classifier serving one ensemble slot.
///
/// Confidence is reported as distance from the decision boundary,
/// `0.5 + |p - 0.5|`, so a coin-flip output still carries half weight.
#[derive(Debug, Clone)]
pub struct ArtifactProbabilityModel {
    component: ComponentId,
    info: ModelInfo,
    model: ScoredModel,
}

impl ArtifactProbabilityModel {
    pub fn new(component: ComponentId, info: ModelInfo, model: ScoredModel) -> Self {
        Self {
            component,
            info,
            model,
        }
    }

    /// Loads a model artifact from disk for the given slot.
    pub fn load(component: ComponentId, path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let artifact = ModelArtifact::load(path)?;
        let info = ModelInfo::new(
            artifact
                .name
                .clone()
                .unwrap_or_else(|| component.as_str().to_string()),
            artifact
                .version
                .clone()
                .unwrap_or_else(|| "unversioned".to_string()),
        );
        info!(
            component = %component,
            path = %path.display(),
            model = %info.name,
            version = %info.version,
            "Loaded model artifact"
        );
        Ok(Self::new(component, info, artifact.into_scored_model()))
    }
}

/// Confidence from distance to the decision boundary.
pub fn boundary_confidence(probability: f64) -> f64 {
    (0.5 + (probability - 0.5).abs()).clamp(0.5, 1.0)
}

#[async_trait]
impl ProbabilityModel for ArtifactProbabilityModel {
    fn component(&self) -> ComponentId {
        self.component
    }

    async fn predict_probability(&self, features: &FeatureVector) -> Result<ModelOutput, ModelError> {
        let probability = self
            .model
            .score(features)
            .map_err(|e| ModelError::failed(e.to_string()))?;
        Ok(ModelOutput::new(probability).with_confidence(boundary_confidence(probability)))
    }

    fn model_info(&self) -> ModelInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::models::LogisticModel;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn boundary_confidence_range() {
        assert_eq!(boundary_confidence(0.5), 0.5);
        assert_eq!(boundary_confidence(0.0), 1.0);
        assert!((boundary_confidence(0.8) - 0.8).abs() < 1e-12);
    }

    #[tokio::test]
    async fn predicts_with_confidence() {
        let scored = ScoredModel::new(
            vec!["team_size".to_string()],
            Arc::new(LogisticModel::new(vec![0.0], 0.0)),
        );
        let model = ArtifactProbabilityModel::new(ComponentId::Temporal, ModelInfo::new("t", "1"), scored);
        let v = FeatureVector::from_record(json!({"team_size": 3}).as_object().unwrap());

        let out = model.predict_probability(&v).await.unwrap();
        assert_eq!(out.probability, 0.5);
        assert_eq!(out.confidence, Some(0.5));
        assert_eq!(model.component(), ComponentId::Temporal);
    }

    #[tokio::test]
    async fn classifier_errors_become_model_failures() {
        let scored = ScoredModel::new(
            vec!["team_size".to_string()],
            Arc::new(LogisticModel::new(vec![1.0, 2.0], 0.0)),
        );
        let model = ArtifactProbabilityModel::new(ComponentId::Industry, ModelInfo::new("i", "1"), scored);
        let err = model.predict_probability(&FeatureVector::empty()).await.unwrap_err();
        assert_eq!(err.kind(), "failed");
    }

    #[test]
    fn load_reads_name_and_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ensemble.json");
        std::fs::write(
            &path,
            json!({
                "name": "camp-ensemble",
                "version": "7",
                "features": ["team_size"],
                "model": {"family": "logistic", "coefficients": [0.1]}
            })
            .to_string(),
        )
        .unwrap();

        let model = ArtifactProbabilityModel::load(ComponentId::Ensemble, &path).unwrap();
        assert_eq!(model.model_info(), ModelInfo::new("camp-ensemble", "7"));
    }
}
