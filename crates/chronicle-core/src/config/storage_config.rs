use serde::{Deserialize, Serialize};

use super::defaults;

/// Reference-store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub db_path: String,
    /// Enable WAL journal mode.
    pub wal_mode: bool,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
    /// Number of read connections in the pool.
    pub read_pool_size: usize,
    /// Advertise case-insensitive actor matching and `@context` lookup.
    pub enhanced_search: bool,
    /// Maximum number of cached per-entity-type log handles.
    pub handle_cache_capacity: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: defaults::DEFAULT_DB_FILENAME.to_string(),
            wal_mode: defaults::DEFAULT_WAL_MODE,
            busy_timeout_ms: defaults::DEFAULT_BUSY_TIMEOUT_MS,
            read_pool_size: defaults::DEFAULT_READ_POOL_SIZE,
            enhanced_search: defaults::DEFAULT_ENHANCED_SEARCH,
            handle_cache_capacity: defaults::DEFAULT_HANDLE_CACHE_CAPACITY,
        }
    }
}
