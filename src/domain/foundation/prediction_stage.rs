//! Per-request prediction lifecycle.

use serde::{Deserialize, Serialize};

use super::StateMachine;

/// Stages a single prediction request moves through.
///
/// The happy path is strictly linear. `Fallback` is reachable from any
/// non-terminal stage and is itself terminal, as is `VerdictAssigned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStage {
    FeaturesPrepared,
    PredictionsCollected,
    WeightsComputed,
    Combined,
    Blended,
    VerdictAssigned,
    Fallback,
}

impl PredictionStage {
    fn next_on_happy_path(&self) -> Option<PredictionStage> {
        use PredictionStage::*;
        match self {
            FeaturesPrepared => Some(PredictionsCollected),
            PredictionsCollected => Some(WeightsComputed),
            WeightsComputed => Some(Combined),
            Combined => Some(Blended),
            Blended => Some(VerdictAssigned),
            VerdictAssigned | Fallback => None,
        }
    }
}

impl StateMachine for PredictionStage {
    fn can_transition_to(&self, target: &Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        *target == PredictionStage::Fallback || self.next_on_happy_path() == Some(*target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self.next_on_happy_path() {
            Some(next) => vec![next, PredictionStage::Fallback],
            None => vec![],
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, PredictionStage::VerdictAssigned | PredictionStage::Fallback)
    }
}
