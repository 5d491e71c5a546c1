//! Pattern Library - static catalog of business patterns.
//!
//! # Components
//!
//! - `MasterCategory` - The 8 top-level groupings
//! - `Predicate` - Conditions over canonical features
//! - `PatternDefinition` - Immutable named archetype with bands, predicates and relationships
//! - `PatternLibrary` - Validated catalog loaded once at startup
//! - `tags` - Independent multi-label tag rules

mod category;
mod definition;
mod library;
mod predicate;
pub mod tags;

pub use category::MasterCategory;
pub use definition::{Band, PatternDefinition};
pub use library::{LibraryError, PatternLibrary};
pub use predicate::{Predicate, PredicateOutcome};
pub use tags::{evaluate_tags, Tag, TagRule};
