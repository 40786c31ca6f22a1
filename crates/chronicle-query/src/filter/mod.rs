//! Filter compilation: native push-down plus the in-memory fallback.

mod compiler;
mod criteria;
pub mod dates;
pub mod pipeline;

pub use compiler::{FilterCompiler, RequestIdResolver};
pub use criteria::{AuditFilters, DateRange, SubjectMatch};
