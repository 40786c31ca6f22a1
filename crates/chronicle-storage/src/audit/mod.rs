//! Producer-side append path of the reference store.

pub mod logger;

pub use logger::{AuditLogger, NewAuditRecord};
