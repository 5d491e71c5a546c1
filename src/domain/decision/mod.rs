//! Decision - the orchestrator's output model.

mod decision_object;

pub use crate::domain::scoring::Verdict;
pub use decision_object::{DecisionMetadata, DecisionObject, PatternAnalysisSummary};
