//! Pattern Matcher - per-pattern confidence and the aggregate pattern profile.
//!
//! # Components
//!
//! - `PatternMatcher` - Band, rule and statistical matching per pattern
//! - `PatternProfile` - Primary, secondaries, mixture, tags, evolution, stability
//! - `StatisticalProfiles` - Learned per-pattern mean vectors
//! - `evolution` - Stage-dependent next-pattern heuristics

pub mod evolution;
mod matcher;
mod profile;
mod statistical;

pub use matcher::{aggregate, band_match, rule_match, MatcherSettings, PatternMatcher};
pub use profile::{
    softmax, stability, success_modifier, uniqueness, EvolutionPrediction, MatchScores, MatchType,
    PatternAnalysis, PatternMatch, PatternProfile, MIXTURE_DISPLAY_FLOOR, PRIMARY_CONFIDENCE,
    SECONDARY_CONFIDENCE,
};
pub use statistical::{profile_vector, LabeledSample, StatisticalProfiles};
