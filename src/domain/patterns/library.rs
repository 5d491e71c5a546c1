//! PatternLibrary - the static, versioned catalog of business patterns.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::domain::features::contract;

use super::{MasterCategory, PatternDefinition};

const BUILTIN_CATALOG: &str = include_str!("../../../assets/pattern_library.yaml");

/// Errors raised while loading or validating a pattern catalog.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to read pattern library {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pattern library: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("pattern library contains no patterns")]
    Empty,

    #[error("duplicate pattern name: {0}")]
    DuplicatePattern(String),

    #[error("pattern '{pattern}' references unknown feature '{feature}'")]
    UnknownFeature { pattern: String, feature: String },

    #[error("pattern '{pattern}' references undeclared pattern '{reference}'")]
    UnknownReference { pattern: String, reference: String },

    #[error("pattern '{pattern}' has a malformed band for {pillar}")]
    InvalidBand { pattern: String, pillar: String },

    #[error("pattern '{pattern}' has typical_success_rate {rate} outside [0, 1]")]
    InvalidSuccessRate { pattern: String, rate: f64 },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    version: String,
    patterns: Vec<PatternDefinition>,
}

/// Immutable catalog of pattern definitions.
///
/// Declaration order is preserved and used as the deterministic tie-break
/// when two patterns score identically.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    version: String,
    patterns: Vec<PatternDefinition>,
    index: HashMap<String, usize>,
}

impl PatternLibrary {
    /// Loads the catalog shipped with the crate.
    pub fn builtin() -> Result<Self, LibraryError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// Loads a catalog from a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| LibraryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let library = Self::from_yaml_str(&raw)?;
        info!(
            path = %path.display(),
            version = %library.version,
            patterns = library.len(),
            "Loaded pattern library"
        );
        Ok(library)
    }

    /// Parses and validates a YAML catalog.
    ///
    /// Predicates are written as single-key maps (`{ min: 3.5 }`) rather
    /// than YAML tags.
    pub fn from_yaml_str(raw: &str) -> Result<Self, LibraryError> {
        let file: CatalogFile = from_yaml(raw)?;
        Self::new(file.version, file.patterns)
    }

    /// Builds a library from definitions, validating cross references.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError` for an empty catalog, duplicate names, unknown
    /// features, dangling pattern references, malformed bands, or a success
    /// rate outside [0, 1].
    pub fn new(
        version: impl Into<String>,
        patterns: Vec<PatternDefinition>,
    ) -> Result<Self, LibraryError> {
        if patterns.is_empty() {
            return Err(LibraryError::Empty);
        }

        let mut index = HashMap::with_capacity(patterns.len());
        for (i, def) in patterns.iter().enumerate() {
            if index.insert(def.name.clone(), i).is_some() {
                return Err(LibraryError::DuplicatePattern(def.name.clone()));
            }
        }

        for def in &patterns {
            validate_definition(def, &index)?;
        }

        Ok(Self {
            version: version.into(),
            patterns,
            index,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// All definitions in declaration order.
    pub fn patterns(&self) -> &[PatternDefinition] {
        &self.patterns
    }

    /// Looks up a definition by name.
    pub fn get(&self, name: &str) -> Option<&PatternDefinition> {
        self.index.get(name).map(|i| &self.patterns[*i])
    }

    /// Position of a pattern in declaration order.
    pub fn declaration_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Definitions belonging to one master category, in declaration order.
    pub fn by_category(
        &self,
        category: MasterCategory,
    ) -> impl Iterator<Item = &PatternDefinition> {
        self.patterns.iter().filter(move |p| p.category == category)
    }

    /// Returns true if either definition declares the other incompatible.
    pub fn are_incompatible(&self, a: &str, b: &str) -> bool {
        let declared = |x: &str, y: &str| self.get(x).is_some_and(|d| d.is_incompatible_with(y));
        declared(a, b) || declared(b, a)
    }
}

/// Deserializes YAML with enums read from single-key maps.
pub(crate) fn from_yaml<T: DeserializeOwned>(raw: &str) -> Result<T, serde_yaml::Error> {
    serde_yaml::with::singleton_map_recursive::deserialize(serde_yaml::Deserializer::from_str(raw))
}

fn validate_definition(
    def: &PatternDefinition,
    index: &HashMap<String, usize>,
) -> Result<(), LibraryError> {
    let mut seen = HashSet::new();
    for feature in def.referenced_features() {
        if seen.insert(feature) && contract::feature_index(feature).is_none() {
            return Err(LibraryError::UnknownFeature {
                pattern: def.name.clone(),
                feature: feature.to_string(),
            });
        }
    }

    for reference in def.referenced_patterns() {
        if !index.contains_key(reference) {
            return Err(LibraryError::UnknownReference {
                pattern: def.name.clone(),
                reference: reference.to_string(),
            });
        }
    }

    for (pillar, band) in &def.bands {
        if !band.is_well_formed() {
            return Err(LibraryError::InvalidBand {
                pattern: def.name.clone(),
                pillar: pillar.to_string(),
            });
        }
    }

    if !(0.0..=1.0).contains(&def.typical_success_rate) {
        return Err(LibraryError::InvalidSuccessRate {
            pattern: def.name.clone(),
            rate: def.typical_success_rate,
        });
    }

    Ok(())
}
