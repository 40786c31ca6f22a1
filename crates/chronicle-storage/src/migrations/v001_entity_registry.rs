//! v001: audited_entities registry. Per-type audit tables are created on
//! demand by `queries::entity_ops::ensure_entity_table`.

use rusqlite::Connection;

use chronicle_core::errors::ChronicleResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> ChronicleResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS audited_entities (
            entity_type TEXT PRIMARY KEY,
            table_name  TEXT NOT NULL UNIQUE,
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
