//! SqliteAuditStore: owns the ConnectionPool, runs migrations, hands out
//! cached per-entity-type log handles, and exposes the producer-side append.

use std::path::Path;
use std::sync::Arc;

use moka::sync::Cache;

use chronicle_core::config::StorageConfig;
use chronicle_core::errors::ChronicleResult;
use chronicle_core::models::StoreCapabilities;
use chronicle_core::{AuditLogStore, ChronicleError};

use crate::audit::{AuditLogger, NewAuditRecord};
use crate::entity_log::SqliteEntityLog;
use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::entity_ops;

/// The reference audit store: one SQLite database, one table per entity type.
pub struct SqliteAuditStore {
    pool: Arc<ConnectionPool>,
    capabilities: StoreCapabilities,
    handles: Cache<String, Arc<SqliteEntityLog>>,
}

impl SqliteAuditStore {
    /// Open a store backed by a file on disk. Reads use the read pool.
    pub fn open(path: &Path, config: &StorageConfig) -> ChronicleResult<Self> {
        let pool = ConnectionPool::open(path, config)?;
        Self::initialize(pool, config)
    }

    /// Open an in-memory store (for testing). Reads go through the writer.
    pub fn open_in_memory() -> ChronicleResult<Self> {
        Self::open_in_memory_with(&StorageConfig::default())
    }

    pub fn open_in_memory_with(config: &StorageConfig) -> ChronicleResult<Self> {
        let pool = ConnectionPool::open_in_memory(config)?;
        Self::initialize(pool, config)
    }

    fn initialize(pool: ConnectionPool, config: &StorageConfig) -> ChronicleResult<Self> {
        pool.writer.with_conn_sync(|conn| {
            migrations::run_migrations(conn)?;
            Ok(())
        })?;
        let capabilities = StoreCapabilities {
            actor_label_search: config.enhanced_search,
            context_lookup: config.enhanced_search,
        };
        Ok(Self {
            pool: Arc::new(pool),
            capabilities,
            handles: Cache::builder()
                .max_capacity(config.handle_cache_capacity)
                .build(),
        })
    }

    /// Get a reference to the connection pool (for advanced operations).
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn capabilities(&self) -> StoreCapabilities {
        self.capabilities
    }

    /// Every entity type that has an audit table.
    pub fn entity_types(&self) -> ChronicleResult<Vec<String>> {
        self.pool.with_reader(entity_ops::list_entity_types)
    }

    /// Read handle for one entity type. Unknown types are unavailable.
    pub fn log(&self, entity_type: &str) -> ChronicleResult<Arc<SqliteEntityLog>> {
        if let Some(handle) = self.handles.get(entity_type) {
            return Ok(handle);
        }
        let table = self
            .pool
            .with_reader(|conn| entity_ops::lookup_table(conn, entity_type))?
            .ok_or_else(|| ChronicleError::store_unavailable(entity_type, "no audit log for this entity type"))?;
        Ok(self.cache_handle(entity_type, table))
    }

    /// Handles for every registered entity type, ready for a registry.
    pub fn logs(&self) -> ChronicleResult<Vec<Arc<dyn AuditLogStore>>> {
        self.entity_types()?
            .iter()
            .map(|entity_type| self.log(entity_type).map(|h| h as Arc<dyn AuditLogStore>))
            .collect()
    }

    /// Create the audit table for an entity type if it does not exist yet.
    pub fn ensure_log(&self, entity_type: &str) -> ChronicleResult<Arc<SqliteEntityLog>> {
        let table = self
            .pool
            .writer
            .with_conn_sync(|conn| entity_ops::ensure_entity_table(conn, entity_type))?;
        Ok(self.cache_handle(entity_type, table))
    }

    fn cache_handle(&self, entity_type: &str, table: String) -> Arc<SqliteEntityLog> {
        let handle = Arc::new(SqliteEntityLog::new(
            entity_type.to_string(),
            table,
            Arc::clone(&self.pool),
            self.capabilities,
        ));
        self.handles.insert(entity_type.to_string(), Arc::clone(&handle));
        handle
    }

    /// Append one record (producer side). Inside an async runtime prefer
    /// [`Self::append_async`].
    pub fn append(&self, record: &NewAuditRecord) -> ChronicleResult<i64> {
        self.pool
            .writer
            .with_conn_sync(|conn| AuditLogger::log(conn, record))
    }

    /// Append one record through the async writer lock.
    pub async fn append_async(&self, record: &NewAuditRecord) -> ChronicleResult<i64> {
        self.pool
            .writer
            .with_conn(|conn| AuditLogger::log(conn, record))
            .await
    }

    /// Append records written by one atomic operation, in one transaction.
    pub fn append_batch(&self, records: &[NewAuditRecord]) -> ChronicleResult<Vec<i64>> {
        self.pool
            .writer
            .with_conn_sync(|conn| AuditLogger::log_batch(conn, records))
    }
}
