//! Domain layer containing the scoring logic and its types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (component ids, probabilities, stage machine, errors)
//! - `features` - The canonical feature contract and `FeatureVector`
//! - `patterns` - Pattern definitions, the pattern library and tag rules
//! - `classification` - Hierarchical category gates and per-pattern classifiers
//! - `matching` - Per-pattern matching and the aggregate pattern profile
//! - `scoring` - Recalibration, weighting, quality blend, verdicts and fallback
//! - `decision` - The `DecisionObject` returned to callers

pub mod classification;
pub mod decision;
pub mod features;
pub mod foundation;
pub mod matching;
pub mod patterns;
pub mod scoring;
