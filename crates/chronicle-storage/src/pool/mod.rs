//! Connection pool managing read/write connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;

use chronicle_core::config::StorageConfig;
use chronicle_core::errors::ChronicleResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// Manages the single write connection and the optional read pool.
///
/// In-memory databases have no read pool: separate in-memory connections
/// are separate databases, so reads go through the writer instead.
pub struct ConnectionPool {
    pub writer: Arc<WriteConnection>,
    pub readers: Option<Arc<ReadPool>>,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a connection pool for the given database file.
    pub fn open(path: &Path, config: &StorageConfig) -> ChronicleResult<Self> {
        let writer = Arc::new(WriteConnection::open(path, config)?);
        let readers = Arc::new(ReadPool::open(path, config)?);
        Ok(Self {
            writer,
            readers: Some(readers),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory connection pool (for testing).
    pub fn open_in_memory(config: &StorageConfig) -> ChronicleResult<Self> {
        let writer = Arc::new(WriteConnection::open_in_memory(config)?);
        Ok(Self {
            writer,
            readers: None,
            db_path: None,
        })
    }

    /// Execute a read-only closure on the best available connection.
    pub fn with_reader<F, T>(&self, f: F) -> ChronicleResult<T>
    where
        F: FnOnce(&Connection) -> ChronicleResult<T>,
    {
        match &self.readers {
            Some(readers) => readers.with_conn(f),
            None => self.writer.with_conn_sync(f),
        }
    }
}
