use crate::errors::ChronicleResult;
use crate::models::{AuditRecord, NativeQuery, StoreCapabilities};

/// Read access to one entity type's append-only change log.
///
/// Implementations evaluate every [`crate::models::NativeFilter`] whose
/// capability they advertise; callers never send a filter whose capability
/// is missing.
pub trait AuditLogStore: Send + Sync {
    /// Entity type this log belongs to.
    fn entity_type(&self) -> &str;

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::default()
    }

    /// Records matching the query, ordered and paginated as requested.
    fn fetch(&self, query: &NativeQuery) -> ChronicleResult<Vec<AuditRecord>>;

    /// Number of records matching the query's filters (limit/offset ignored).
    fn count(&self, query: &NativeQuery) -> ChronicleResult<usize>;

    /// A single record by its log-local id.
    fn find(&self, id: i64) -> ChronicleResult<Option<AuditRecord>>;
}
