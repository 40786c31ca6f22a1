mod field_accessor;
mod log_store;

pub use field_accessor::FieldAccessor;
pub use log_store::AuditLogStore;
