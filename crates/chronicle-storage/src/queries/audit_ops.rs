//! Row-level operations on a per-type audit table.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row};

use chronicle_core::errors::ChronicleResult;
use chronicle_core::models::{AuditRecord, ChangeKind, ChangeSet, NativeFilter, NativeQuery};

use super::filter_sql::{compile, format_timestamp};
use crate::{to_corruption_err, to_storage_err};

const RECORD_COLUMNS: &str = "id, subject_id, change_kind, change_set, correlation_hash, \
     actor_id, actor_label, source_address, occurred_at";

/// Column values for one appended row.
pub struct RecordRow<'a> {
    pub subject_id: &'a str,
    pub change_kind: ChangeKind,
    pub change_set: &'a str,
    pub correlation_hash: &'a str,
    pub actor_id: Option<&'a str>,
    pub actor_label: Option<&'a str>,
    pub source_address: Option<&'a str>,
    pub occurred_at: &'a DateTime<Utc>,
}

/// Append one row, returning its log-local id.
pub fn insert_record(conn: &Connection, table: &str, row: &RecordRow<'_>) -> ChronicleResult<i64> {
    conn.execute(
        &format!(
            "INSERT INTO {table} (subject_id, change_kind, change_set, correlation_hash, \
             actor_id, actor_label, source_address, occurred_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        ),
        rusqlite::params![
            row.subject_id,
            row.change_kind.as_str(),
            row.change_set,
            row.correlation_hash,
            row.actor_id,
            row.actor_label,
            row.source_address,
            format_timestamp(row.occurred_at),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(conn.last_insert_rowid())
}

/// Records matching the query, ordered and paginated.
pub fn fetch(
    conn: &Connection,
    table: &str,
    entity_type: &str,
    query: &NativeQuery,
) -> ChronicleResult<Vec<AuditRecord>> {
    let sql = compile(query);
    let statement = format!(
        "SELECT {RECORD_COLUMNS} FROM {table}{}{}{}",
        sql.where_clause, sql.order_clause, sql.limit_clause
    );
    let mut stmt = conn
        .prepare(&statement)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let params = sql.param_refs();
    let rows = stmt
        .query_map(params.as_slice(), |row| Ok(parse_record_row(row, entity_type)))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut results = Vec::new();
    for row in rows {
        let record = row.map_err(|e| to_storage_err(e.to_string()))??;
        results.push(record);
    }
    Ok(results)
}

/// Number of records matching the query's filters.
pub fn count(conn: &Connection, table: &str, query: &NativeQuery) -> ChronicleResult<usize> {
    let sql = compile(query);
    let statement = format!("SELECT COUNT(*) FROM {table}{}", sql.where_clause);
    let params = sql.param_refs();
    let total: i64 = conn
        .query_row(&statement, params.as_slice(), |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(total.max(0) as usize)
}

/// A single record by id.
pub fn find(
    conn: &Connection,
    table: &str,
    entity_type: &str,
    id: i64,
) -> ChronicleResult<Option<AuditRecord>> {
    let query = NativeQuery::new().filter(NativeFilter::Id(id));
    let sql = compile(&query);
    let statement = format!("SELECT {RECORD_COLUMNS} FROM {table}{}", sql.where_clause);
    let params = sql.param_refs();
    let found = conn
        .query_row(&statement, params.as_slice(), |row| {
            Ok(parse_record_row(row, entity_type))
        })
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    found.transpose()
}

/// Decode one row. Undecodable payloads surface as corruption errors.
fn parse_record_row(row: &Row<'_>, entity_type: &str) -> ChronicleResult<AuditRecord> {
    let get_err = |e: rusqlite::Error| to_storage_err(e.to_string());

    let id: i64 = row.get(0).map_err(get_err)?;
    let kind_str: String = row.get(2).map_err(get_err)?;
    let change_set_str: String = row.get(3).map_err(get_err)?;
    let occurred_str: String = row.get(8).map_err(get_err)?;

    let change_kind: ChangeKind = kind_str
        .parse()
        .map_err(|_| to_corruption_err(format!("record {id}: unknown change kind '{kind_str}'")))?;
    let change_set: serde_json::Value = serde_json::from_str(&change_set_str)
        .map_err(|e| to_corruption_err(format!("record {id}: change set is not JSON: {e}")))?;
    let occurred_at = DateTime::parse_from_rfc3339(&occurred_str)
        .map_err(|e| to_corruption_err(format!("record {id}: bad timestamp '{occurred_str}': {e}")))?
        .with_timezone(&Utc);

    Ok(AuditRecord {
        id,
        entity_type: entity_type.to_string(),
        subject_id: row.get(1).map_err(get_err)?,
        change_kind,
        change_set: ChangeSet::from_value(change_set),
        correlation_hash: row.get(4).map_err(get_err)?,
        actor_id: row.get(5).map_err(get_err)?,
        actor_label: row.get(6).map_err(get_err)?,
        source_address: row.get(7).map_err(get_err)?,
        occurred_at,
    })
}
