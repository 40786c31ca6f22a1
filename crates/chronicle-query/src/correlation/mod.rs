//! Cross-entity-type correlation via scatter-gather over the registry.

mod engine;
mod timeline;

pub use engine::{CorrelationEngine, Grouped};
pub use timeline::{merge_timeline, MergedTimeline, TimelineEntry};
