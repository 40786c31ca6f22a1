//! Registry of audited entity types and their per-type tables.

use rusqlite::{Connection, OptionalExtension};

use chronicle_core::errors::ChronicleResult;

use crate::to_storage_err;

/// Deterministic table name for an entity type: a readable slug plus a
/// short blake3 suffix so `App\Order` and `App.Order` never collide.
pub fn table_name_for(entity_type: &str) -> String {
    let slug: String = entity_type
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let slug = slug.trim_matches('_');
    let digest = blake3::hash(entity_type.as_bytes()).to_hex();
    format!("audit_{}_{}", slug, &digest.as_str()[..8])
}

/// Create the audit table for an entity type if needed and register it.
/// Returns the table name.
pub fn ensure_entity_table(conn: &Connection, entity_type: &str) -> ChronicleResult<String> {
    if let Some(existing) = lookup_table(conn, entity_type)? {
        return Ok(existing);
    }

    let table = table_name_for(entity_type);
    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS {table} (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            subject_id       TEXT NOT NULL,
            change_kind      TEXT NOT NULL,
            change_set       TEXT NOT NULL DEFAULT '{{}}',
            correlation_hash TEXT NOT NULL,
            actor_id         TEXT,
            actor_label      TEXT,
            source_address   TEXT,
            occurred_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_{table}_subject ON {table}(subject_id);
        CREATE INDEX IF NOT EXISTS idx_{table}_kind ON {table}(change_kind);
        CREATE INDEX IF NOT EXISTS idx_{table}_correlation ON {table}(correlation_hash);
        CREATE INDEX IF NOT EXISTS idx_{table}_occurred ON {table}(occurred_at, id);
        CREATE INDEX IF NOT EXISTS idx_{table}_actor ON {table}(actor_label);
        "
    ))
    .map_err(|e| to_storage_err(e.to_string()))?;

    conn.execute(
        "INSERT INTO audited_entities (entity_type, table_name) VALUES (?1, ?2)",
        rusqlite::params![entity_type, table],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    tracing::info!(entity_type, table = %table, "created audit table for entity type");
    Ok(table)
}

/// Table name registered for an entity type.
pub fn lookup_table(conn: &Connection, entity_type: &str) -> ChronicleResult<Option<String>> {
    conn.query_row(
        "SELECT table_name FROM audited_entities WHERE entity_type = ?1",
        [entity_type],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Every registered entity type, sorted.
pub fn list_entity_types(conn: &Connection) -> ChronicleResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT entity_type FROM audited_entities ORDER BY entity_type")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}
