//! Feature Contract - the fixed, ordered schema every component agrees on.
//!
//! # Components
//!
//! - `contract` - The 45 canonical features, their kinds, vocabularies and normalizers
//! - `FeatureVector` - Total, default-filling projection from a raw record
//! - `coercion` - Lenient value coercion used at the boundary

pub mod coercion;
pub mod contract;
mod vector;

pub use contract::{
    encoded_names, feature_count, FeatureKind, FeatureSpec, Normalizer, Pillar, FEATURES,
    FUNDING_STAGES, INVESTOR_TIERS, PRODUCT_STAGES, SECTORS,
};
pub use vector::{FeatureValue, FeatureVector, RawRecord};

use thiserror::Error;

/// Raised when a raw input cannot be projected onto the contract at all.
///
/// The orchestrator routes this to the fallback path; it never reaches callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeaturePreparationError {
    #[error("input must be an object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("none of the canonical features present ({fields_seen} fields seen)")]
    NoCanonicalFeatures { fields_seen: usize },
}
