mod audit_context;
mod audit_record;
mod change_kind;
pub mod change_set;
mod field_value;
pub mod query;

pub use audit_context::AuditContext;
pub use audit_record::AuditRecord;
pub use change_kind::ChangeKind;
pub use change_set::{AssociationLink, ChangeSet, EntityRef, EntitySummary, FieldChange};
pub use field_value::{member_identity, EnumCase, FieldValue, TypeDescriptor};
pub use query::{
    NativeFilter, NativeQuery, PaginatedResult, SortDirection, SortField, StoreCapabilities,
};
