//! # chronicle-core
//!
//! Foundation crate for the Chronicle audit reader.
//! Defines the audit record model, change classification, field values,
//! query models, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod diff;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::ChronicleConfig;
pub use diff::ChangeCategory;
pub use errors::{ChronicleError, ChronicleResult};
pub use models::{AuditRecord, ChangeKind, ChangeSet, FieldValue, PaginatedResult, TypeDescriptor};
pub use traits::{AuditLogStore, FieldAccessor};
