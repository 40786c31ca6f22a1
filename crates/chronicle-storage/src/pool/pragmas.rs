//! PRAGMA configuration applied to every SQLite connection.
//!
//! WAL mode (when enabled), NORMAL sync, configurable busy_timeout.
//! Read connections additionally set `query_only`. Every connection gets the
//! Unicode case fold used by actor label filters.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

use chronicle_core::config::StorageConfig;
use chronicle_core::errors::ChronicleResult;

use crate::to_storage_err;

/// Apply pragmas to the write connection.
pub fn apply_pragmas(conn: &Connection, config: &StorageConfig) -> ChronicleResult<()> {
    let journal = if config.wal_mode { "WAL" } else { "DELETE" };
    conn.execute_batch(&format!(
        "
        PRAGMA journal_mode = {journal};
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = {};
        PRAGMA foreign_keys = ON;
        ",
        config.busy_timeout_ms
    ))
    .map_err(|e| to_storage_err(e.to_string()))?;
    register_functions(conn)
}

/// Apply pragmas to a read connection.
pub fn apply_read_pragmas(conn: &Connection, config: &StorageConfig) -> ChronicleResult<()> {
    conn.execute_batch(&format!(
        "
        PRAGMA busy_timeout = {};
        PRAGMA query_only = ON;
        ",
        config.busy_timeout_ms
    ))
    .map_err(|e| to_storage_err(e.to_string()))?;
    register_functions(conn)
}

/// SQL name of the case fold. SQLite's own `lower()` only folds ASCII, so
/// `É` and `é` would not compare equal.
pub const FOLD_FUNCTION: &str = "chronicle_fold";

/// Register `chronicle_fold(text)`: Rust's Unicode `to_lowercase`, NULL in,
/// NULL out.
pub fn register_functions(conn: &Connection) -> ChronicleResult<()> {
    conn.create_scalar_function(
        FOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|v| v.to_lowercase()))
        },
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Verify that WAL mode is active on a connection.
pub fn verify_wal_mode(conn: &Connection) -> ChronicleResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
