//! Append audit records to per-type tables. This is the upstream producer's
//! side of the log; the read path never calls it.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde_json::{Map, Value};

use chronicle_core::errors::ChronicleResult;
use chronicle_core::models::ChangeKind;

use crate::queries::audit_ops::{self, RecordRow};
use crate::queries::entity_ops;
use crate::to_storage_err;

/// Maximum number of records accepted by one batch append.
pub const MAX_BATCH_SIZE: usize = 5_000;

/// A record as handed over by the producer, before it has an id.
#[derive(Debug, Clone)]
pub struct NewAuditRecord {
    pub entity_type: String,
    pub subject_id: String,
    pub change_kind: ChangeKind,
    pub change_set: Map<String, Value>,
    /// Generated when absent.
    pub correlation_hash: Option<String>,
    pub actor_id: Option<String>,
    pub actor_label: Option<String>,
    pub source_address: Option<String>,
    /// Defaults to now.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl NewAuditRecord {
    pub fn new(entity_type: &str, subject_id: &str, change_kind: ChangeKind, change_set: Value) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            subject_id: subject_id.to_string(),
            change_kind,
            change_set: match change_set {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            correlation_hash: None,
            actor_id: None,
            actor_label: None,
            source_address: None,
            occurred_at: None,
        }
    }

    pub fn actor(mut self, actor_id: Option<&str>, actor_label: Option<&str>) -> Self {
        self.actor_id = actor_id.map(str::to_string);
        self.actor_label = actor_label.map(str::to_string);
        self
    }

    pub fn at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    pub fn correlated(mut self, correlation_hash: &str) -> Self {
        self.correlation_hash = Some(correlation_hash.to_string());
        self
    }

    pub fn from_address(mut self, source_address: &str) -> Self {
        self.source_address = Some(source_address.to_string());
        self
    }
}

/// Append-only audit logger.
pub struct AuditLogger;

impl AuditLogger {
    /// Append one record, creating its entity type's table on first use.
    pub fn log(conn: &Connection, record: &NewAuditRecord) -> ChronicleResult<i64> {
        let hash = record
            .correlation_hash
            .clone()
            .unwrap_or_else(new_correlation_hash);
        Self::insert(conn, record, &hash)
    }

    /// Append records from one atomic write in a single transaction.
    /// Records without a correlation hash share one generated hash.
    pub fn log_batch(conn: &Connection, records: &[NewAuditRecord]) -> ChronicleResult<Vec<i64>> {
        if records.len() > MAX_BATCH_SIZE {
            return Err(to_storage_err(format!(
                "batch size {} exceeds MAX_BATCH_SIZE ({MAX_BATCH_SIZE})",
                records.len()
            )));
        }
        let shared_hash = new_correlation_hash();

        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| to_storage_err(e.to_string()))?;

        let mut ids = Vec::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            let hash = record.correlation_hash.as_deref().unwrap_or(&shared_hash);
            match Self::insert(conn, record, hash) {
                Ok(id) => ids.push(id),
                Err(e) => {
                    let _ = conn.execute_batch("ROLLBACK");
                    return Err(to_storage_err(format!(
                        "batch insert failed at index {idx} (entity_type='{}', subject_id='{}'): {e}",
                        record.entity_type, record.subject_id
                    )));
                }
            }
        }

        if let Err(e) = conn.execute_batch("COMMIT") {
            // A failed COMMIT can leave the transaction open.
            let _ = conn.execute_batch("ROLLBACK");
            return Err(to_storage_err(format!("batch commit failed: {e}")));
        }
        Ok(ids)
    }

    fn insert(conn: &Connection, record: &NewAuditRecord, hash: &str) -> ChronicleResult<i64> {
        let table = entity_ops::ensure_entity_table(conn, &record.entity_type)?;
        let change_set = Value::Object(record.change_set.clone()).to_string();
        let occurred_at = record.occurred_at.unwrap_or_else(Utc::now);
        audit_ops::insert_record(
            conn,
            &table,
            &RecordRow {
                subject_id: &record.subject_id,
                change_kind: record.change_kind,
                change_set: &change_set,
                correlation_hash: hash,
                actor_id: record.actor_id.as_deref(),
                actor_label: record.actor_label.as_deref(),
                source_address: record.source_address.as_deref(),
                occurred_at: &occurred_at,
            },
        )
    }
}

/// 40-hex-character correlation hash for one atomic write.
pub fn new_correlation_hash() -> String {
    let digest = blake3::hash(uuid::Uuid::new_v4().as_bytes()).to_hex();
    digest.as_str()[..40].to_string()
}
