//! Decision observer adapters.

mod in_memory;
mod tracing_observer;

pub use in_memory::InMemoryObserver;
pub use tracing_observer::TracingObserver;
