//! `SqliteEntityLog`: one entity type's audit table behind `AuditLogStore`.

use std::sync::Arc;

use chronicle_core::errors::ChronicleResult;
use chronicle_core::models::{AuditRecord, NativeFilter, NativeQuery, StoreCapabilities};
use chronicle_core::{AuditLogStore, ChronicleError};

use crate::pool::ConnectionPool;
use crate::queries::audit_ops;

/// Read handle over one per-type audit table.
pub struct SqliteEntityLog {
    entity_type: String,
    table: String,
    pool: Arc<ConnectionPool>,
    capabilities: StoreCapabilities,
}

impl SqliteEntityLog {
    pub(crate) fn new(
        entity_type: String,
        table: String,
        pool: Arc<ConnectionPool>,
        capabilities: StoreCapabilities,
    ) -> Self {
        Self {
            entity_type,
            table,
            pool,
            capabilities,
        }
    }

    /// Refuse filters whose capability this handle does not advertise.
    fn check_supported(&self, query: &NativeQuery) -> ChronicleResult<()> {
        for filter in &query.filters {
            let supported = match filter {
                NativeFilter::ActorLabelIgnoreCase(_) | NativeFilter::ActorLabelContains(_) => {
                    self.capabilities.actor_label_search
                }
                NativeFilter::RequestId(_) => self.capabilities.context_lookup,
                _ => true,
            };
            if !supported {
                return Err(ChronicleError::store_unavailable(
                    &self.entity_type,
                    format!("filter {filter:?} not supported by this store"),
                ));
            }
        }
        Ok(())
    }
}

impl AuditLogStore for SqliteEntityLog {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn capabilities(&self) -> StoreCapabilities {
        self.capabilities
    }

    fn fetch(&self, query: &NativeQuery) -> ChronicleResult<Vec<AuditRecord>> {
        self.check_supported(query)?;
        self.pool
            .with_reader(|conn| audit_ops::fetch(conn, &self.table, &self.entity_type, query))
    }

    fn count(&self, query: &NativeQuery) -> ChronicleResult<usize> {
        self.check_supported(query)?;
        self.pool
            .with_reader(|conn| audit_ops::count(conn, &self.table, query))
    }

    fn find(&self, id: i64) -> ChronicleResult<Option<AuditRecord>> {
        self.pool
            .with_reader(|conn| audit_ops::find(conn, &self.table, &self.entity_type, id))
    }
}
