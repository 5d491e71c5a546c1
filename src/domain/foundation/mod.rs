//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, lifecycle enums, and error types
//! that form the vocabulary of the scoring domain.

mod component_id;
mod errors;
mod prediction_stage;
mod probability;
mod state_machine;

pub use component_id::ComponentId;
pub use errors::ValidationError;
pub use prediction_stage::PredictionStage;
pub use probability::Probability;
pub use state_machine::StateMachine;
