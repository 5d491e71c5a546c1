//! Stage-dependent evolution heuristics.

use crate::domain::features::FeatureVector;
use crate::domain::patterns::PatternDefinition;

use super::EvolutionPrediction;

/// Each further declared target is this much less likely than the previous.
const TARGET_DECAY: f64 = 0.7;

/// Maturity bucket derived from the funding stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageBucket {
    Early,
    Mid,
    Late,
}

impl StageBucket {
    /// Bucket for a vector. An absent funding stage reads as mid.
    pub fn of(vector: &FeatureVector) -> Self {
        if !vector.is_present("funding_stage") {
            return StageBucket::Mid;
        }
        match vector.category("funding_stage") {
            Some("pre_seed") | Some("seed") => StageBucket::Early,
            Some("series_c") | Some("growth") => StageBucket::Late,
            _ => StageBucket::Mid,
        }
    }

    /// Probability that the first declared target is reached.
    pub fn base_probability(&self) -> f64 {
        match self {
            StageBucket::Early => 0.6,
            StageBucket::Mid => 0.4,
            StageBucket::Late => 0.2,
        }
    }
}

/// Predicted next patterns for a primary pattern, in declared order.
pub fn predict_evolution(def: &PatternDefinition, vector: &FeatureVector) -> Vec<EvolutionPrediction> {
    let base = StageBucket::of(vector).base_probability();
    def.evolves_to
        .iter()
        .enumerate()
        .map(|(i, target)| EvolutionPrediction {
            pattern: target.clone(),
            probability: base * TARGET_DECAY.powi(i as i32),
        })
        .collect()
}
