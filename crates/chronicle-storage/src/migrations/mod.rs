//! Versioned schema migrations, tracked in `schema_version`.

mod v001_entity_registry;

use rusqlite::Connection;

use chronicle_core::errors::{ChronicleResult, StorageError};
use chronicle_core::ChronicleError;

use crate::to_storage_err;

type Migration = fn(&Connection) -> ChronicleResult<()>;

const MIGRATIONS: &[(u32, Migration)] = &[(1, v001_entity_registry::migrate)];

/// Current schema version after all migrations.
pub const LATEST_VERSION: u32 = 1;

/// Apply every migration newer than the recorded schema version.
pub fn run_migrations(conn: &Connection) -> ChronicleResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version     INTEGER PRIMARY KEY,
            applied_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let current = current_version(conn)?;
    for (version, migrate) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        migrate(conn).map_err(|e| {
            ChronicleError::StorageError(StorageError::MigrationFailed {
                version: *version,
                reason: e.to_string(),
            })
        })?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        tracing::info!(version, "applied audit schema migration");
    }
    current_version(conn)
}

/// Highest applied migration version (0 on a fresh database).
pub fn current_version(conn: &Connection) -> ChronicleResult<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
