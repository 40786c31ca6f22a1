//! # chronicle-query
//!
//! Read side of the audit trail: the system-actor heuristic, the filter
//! compiler with its in-memory pipeline, the registry of per-entity-type
//! logs, and the scatter-gather correlation engine.

pub mod actor;
pub mod correlation;
pub mod filter;
pub mod registry;

pub use actor::{SentinelHeuristic, SystemActorPredicate};
pub use correlation::{merge_timeline, CorrelationEngine, MergedTimeline, TimelineEntry};
pub use filter::{AuditFilters, FilterCompiler, RequestIdResolver, SubjectMatch};
pub use registry::EntityLogRegistry;
