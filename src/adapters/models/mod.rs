//! Model adapters - trained artifacts and test doubles.
//!
//! - `LogisticModel`, `TreeEnsembleModel` - `BinaryClassifier` implementations
//! - `ArtifactProbabilityModel` - Artifact-backed per-axis `ProbabilityModel`
//! - `MockProbabilityModel` - Configurable test double
//! - `load_classifier_dir` - Builds the hierarchical classifier from a manifest

mod artifact;
mod artifact_model;
mod logistic;
mod mock_model;
mod tree_ensemble;

pub use artifact::{load_classifier_dir, ArtifactError, ClassifierArtifact, ModelArtifact, MANIFEST_FILE};
pub use artifact_model::{boundary_confidence, ArtifactProbabilityModel};
pub use logistic::{sigmoid, LogisticModel};
pub use mock_model::MockProbabilityModel;
pub use tree_ensemble::{Aggregation, DecisionTree, TreeEnsembleModel, TreeNode};
