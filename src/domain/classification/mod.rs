//! Pattern Classifiers - hierarchical category gates and per-pattern models.
//!
//! # Components
//!
//! - `HierarchicalClassifier` - Tier-1 category gates feeding tier-2 pattern models
//! - `StandardScaler` - Per-pattern input standardization
//! - `select_threshold` - Precision-constrained threshold tuning

mod hierarchical;
mod scaler;
mod threshold;

pub use hierarchical::{
    ClassifierMatch, HierarchicalClassifier, PatternModel, ScoredModel, DEFAULT_GATE_THRESHOLD,
    INCLUSION_MARGIN,
};
pub use scaler::StandardScaler;
pub use threshold::{select_threshold, DEFAULT_THRESHOLD, MIN_PRECISION};
