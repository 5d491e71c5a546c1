//! EngineBuilder - wires artifacts, models and observers into a PredictionEngine.
//!
//! All read-only artifacts are loaded here once and then shared by `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::adapters::{load_classifier_dir, ArtifactError, ArtifactProbabilityModel};
use crate::config::{AppConfig, ValidationError as ConfigValidationError};
use crate::domain::classification::HierarchicalClassifier;
use crate::domain::foundation::ComponentId;
use crate::domain::matching::{MatcherSettings, PatternMatcher, StatisticalProfiles};
use crate::domain::patterns::{LibraryError, PatternLibrary};
use crate::ports::{DecisionObserver, NoOpObserver, ProbabilityModel};

use super::engine::{EngineSettings, PredictionEngine};

/// Errors raised while assembling an engine.
#[derive(Debug, Error)]
pub enum EngineBuildError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigValidationError),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Builder for [`PredictionEngine`].
pub struct EngineBuilder {
    library: Option<Arc<PatternLibrary>>,
    models: BTreeMap<ComponentId, Arc<dyn ProbabilityModel>>,
    classifier: Option<Arc<HierarchicalClassifier>>,
    profiles: Option<Arc<StatisticalProfiles>>,
    matcher_settings: MatcherSettings,
    observer: Arc<dyn DecisionObserver>,
    settings: EngineSettings,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    /// Built-in library, default settings, no models, no-op observer.
    pub fn new() -> Self {
        Self {
            library: None,
            models: BTreeMap::new(),
            classifier: None,
            profiles: None,
            matcher_settings: MatcherSettings::default(),
            observer: Arc::new(NoOpObserver),
            settings: EngineSettings::default(),
        }
    }

    /// Loads everything the configuration points at.
    ///
    /// Per-axis models are added only for configured artifact paths; callers
    /// decide what fills the remaining axes.
    ///
    /// # Errors
    ///
    /// Invalid configuration, an unreadable pattern library, a missing
    /// classifier manifest or an unreadable per-axis artifact.
    pub fn from_config(config: &AppConfig) -> Result<Self, EngineBuildError> {
        let settings = EngineSettings::from_config(&config.orchestrator)?;
        config.patterns.validate()?;

        let library = match &config.patterns.library_path {
            Some(path) => PatternLibrary::from_path(path)?,
            None => PatternLibrary::builtin()?,
        };
        let library = Arc::new(library);

        let mut builder = Self::new()
            .with_library(Arc::clone(&library))
            .with_settings(settings)
            .with_matcher_settings(config.patterns.matcher_settings());

        if let Some(dir) = &config.patterns.classifier_dir {
            let classifier = load_classifier_dir(dir, Arc::clone(&library), config.patterns.gate_threshold)?;
            builder = builder.with_classifier(Arc::new(classifier));
        }

        for component in ComponentId::model_axes() {
            if let Some(path) = config.orchestrator.model_path(*component) {
                let model = ArtifactProbabilityModel::load(*component, path)?;
                builder = builder.with_model(Arc::new(model));
            }
        }

        info!(
            library_version = library.version(),
            patterns = library.len(),
            models = builder.models.len(),
            "Engine configuration loaded"
        );
        Ok(builder)
    }

    pub fn with_library(mut self, library: Arc<PatternLibrary>) -> Self {
        self.library = Some(library);
        self
    }

    /// Adds a per-axis model, replacing any earlier model for the same axis.
    pub fn with_model(mut self, model: Arc<dyn ProbabilityModel>) -> Self {
        let component = model.component();
        if !component.is_model_axis() {
            warn!(component = component.as_str(), "Ignoring model for a non-model component");
            return self;
        }
        self.models.insert(component, model);
        self
    }

    pub fn has_model(&self, component: ComponentId) -> bool {
        self.models.contains_key(&component)
    }

    pub fn with_classifier(mut self, classifier: Arc<HierarchicalClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_profiles(mut self, profiles: Arc<StatisticalProfiles>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn with_matcher_settings(mut self, settings: MatcherSettings) -> Self {
        self.matcher_settings = settings;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn DecisionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Assembles the engine.
    ///
    /// # Errors
    ///
    /// Only if no library was supplied and the built-in catalog fails to parse.
    pub fn build(self) -> Result<PredictionEngine, EngineBuildError> {
        let library = match self.library {
            Some(library) => library,
            None => Arc::new(PatternLibrary::builtin()?),
        };

        let mut matcher = PatternMatcher::new(library).with_settings(self.matcher_settings);
        if let Some(classifier) = self.classifier {
            matcher = matcher.with_classifier(classifier);
        }
        if let Some(profiles) = self.profiles {
            matcher = matcher.with_profiles(profiles);
        }

        Ok(PredictionEngine::new(
            self.models,
            Arc::new(matcher),
            self.observer,
            self.settings,
        ))
    }
}
