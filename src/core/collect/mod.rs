//! File collection and loading.
//!
//! - **walker**: directory traversal and path filtering
//! - **priority**: basename priority scoring
//! - **loader**: bounded concurrent reads and the sort barrier

pub mod loader;
pub mod priority;
pub mod walker;

pub use loader::{ConcurrentLoader, LoadOutcome};
pub use priority::PriorityScorer;
pub use walker::PathCollector;
