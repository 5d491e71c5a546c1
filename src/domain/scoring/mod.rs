//! Scoring - the orchestrator's deterministic arithmetic.
//!
//! # Components
//!
//! - `CategoryScores` - Capital, Advantage, Market and People composites
//! - `RecalibrationTable` - Piecewise-linear remap of implausible probabilities
//! - `WeightTable` - Static weights, overrides and confidence-adaptive normalization
//! - `QualityBlend` - Model-free quality score and its blend with the raw score
//! - `Verdict` - Six-band verdicts plus the fallback bands
//! - `FallbackAssessment` - Heuristic path when the pipeline cannot run

mod agreement;
mod category_scores;
mod fallback;
mod key_factors;
mod quality;
mod recalibration;
mod verdict;
mod weighting;

pub use agreement::{component_agreement, mean_confidence, overall_confidence, AGREEMENT_SHARE};
pub use category_scores::{CategoryScores, NEUTRAL_PILLAR_SCORE};
pub use fallback::{FallbackAssessment, FallbackReason, FALLBACK_COVERAGE_GAIN, FALLBACK_MIN_CONFIDENCE};
pub use key_factors::{key_factors, pillar_factors, MAX_KEY_FACTORS, RISK_PILLAR_SCORE, STRENGTH_PILLAR_SCORE};
pub use quality::QualityBlend;
pub use recalibration::{RecalibrationBand, RecalibrationTable};
pub use verdict::Verdict;
pub use weighting::WeightTable;
