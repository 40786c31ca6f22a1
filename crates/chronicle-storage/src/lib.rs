//! # chronicle-storage
//!
//! SQLite-backed reference implementation of the per-entity-type audit log.
//! Each entity type gets its own append-only table; reads go through a
//! pool of read connections and per-type log handles are cached.

pub mod audit;
pub mod engine;
pub mod entity_log;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use audit::{AuditLogger, NewAuditRecord};
pub use engine::SqliteAuditStore;
pub use entity_log::SqliteEntityLog;

use chronicle_core::errors::StorageError;
use chronicle_core::ChronicleError;

/// Wrap a backend failure message as a storage error.
pub fn to_storage_err(message: String) -> ChronicleError {
    ChronicleError::StorageError(StorageError::SqliteError { message })
}

/// Wrap a row that could not be decoded as a corruption error.
pub fn to_corruption_err(details: String) -> ChronicleError {
    ChronicleError::StorageError(StorageError::CorruptionDetected { details })
}
