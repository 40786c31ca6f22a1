//! The audit store's only writer, behind `tokio::sync::Mutex`.
//!
//! Producers append records through it (`append_async` awaits the lock,
//! `append` and `append_batch` take it synchronously) and schema migrations
//! run on it at open. An in-memory store has no read pool, so entity-log
//! reads go through this connection as well.

use std::path::Path;

use rusqlite::Connection;
use tokio::sync::Mutex;

use chronicle_core::config::StorageConfig;
use chronicle_core::errors::ChronicleResult;

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

/// A single write connection protected by an async mutex.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Open a new write connection to the given database path.
    pub fn open(path: &Path, config: &StorageConfig) -> ChronicleResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory(config: &StorageConfig) -> ChronicleResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the write lock and execute a closure with the connection.
    pub async fn with_conn<F, T>(&self, f: F) -> ChronicleResult<T>
    where
        F: FnOnce(&Connection) -> ChronicleResult<T>,
    {
        let guard = self.conn.lock().await;
        f(&guard)
    }

    /// Synchronous access for non-async contexts (migrations, sync appends,
    /// in-memory reads). Uncontended access never blocks; a contended call
    /// must not come from inside an async runtime.
    pub fn with_conn_sync<F, T>(&self, f: F) -> ChronicleResult<T>
    where
        F: FnOnce(&Connection) -> ChronicleResult<T>,
    {
        let guard = match self.conn.try_lock() {
            Ok(guard) => guard,
            Err(_) => self.conn.blocking_lock(),
        };
        f(&guard)
    }
}
