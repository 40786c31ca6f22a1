//! Shared fixtures for Chronicle tests: golden JSON datasets, record
//! builders, and in-process `AuditLogStore` doubles.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use chronicle_core::errors::ChronicleResult;
use chronicle_core::models::{AuditRecord, ChangeKind, ChangeSet, NativeQuery, StoreCapabilities};
use chronicle_core::{AuditLogStore, ChronicleError};

/// Root directory of the test-fixtures folder.
fn fixtures_root() -> PathBuf {
    // Works from any crate in the workspace: walk up to find test-fixtures.
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);

    while !path.join("test-fixtures").join("audit").exists() {
        if !path.pop() {
            panic!(
                "Could not find test-fixtures directory from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("test-fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a fixture file of audit records.
pub fn load_records(relative_path: &str) -> Vec<AuditRecord> {
    load_fixture(relative_path)
}

/// Install a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Parse an RFC 3339 timestamp.
///
/// # Panics
/// Panics on malformed input.
pub fn ts(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap_or_else(|e| panic!("bad fixture timestamp {rfc3339}: {e}"))
        .with_timezone(&Utc)
}

/// Fluent builder for hand-written records.
pub struct RecordBuilder {
    record: AuditRecord,
}

impl RecordBuilder {
    /// An `Updated` record with an empty change set at 2024-01-01T00:00:00Z.
    pub fn new(entity_type: &str, id: i64, subject_id: &str) -> Self {
        Self {
            record: AuditRecord {
                id,
                entity_type: entity_type.to_string(),
                subject_id: subject_id.to_string(),
                change_kind: ChangeKind::Updated,
                change_set: ChangeSet::empty(),
                correlation_hash: format!("hash-{id}"),
                actor_id: None,
                actor_label: None,
                source_address: None,
                occurred_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            },
        }
    }

    pub fn kind(mut self, kind: ChangeKind) -> Self {
        self.record.change_kind = kind;
        self
    }

    pub fn change_set(mut self, change_set: Value) -> Self {
        self.record.change_set = ChangeSet::from_value(change_set);
        self
    }

    pub fn actor(mut self, actor_id: Option<&str>, actor_label: Option<&str>) -> Self {
        self.record.actor_id = actor_id.map(str::to_string);
        self.record.actor_label = actor_label.map(str::to_string);
        self
    }

    pub fn at(mut self, rfc3339: &str) -> Self {
        self.record.occurred_at = ts(rfc3339);
        self
    }

    pub fn at_time(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.record.occurred_at = occurred_at;
        self
    }

    pub fn hash(mut self, correlation_hash: &str) -> Self {
        self.record.correlation_hash = correlation_hash.to_string();
        self
    }

    pub fn build(self) -> AuditRecord {
        self.record
    }
}

/// In-process log store evaluating queries with the reference semantics.
/// Every query it receives is recorded for assertions.
pub struct InMemoryLogStore {
    entity_type: String,
    records: Vec<AuditRecord>,
    capabilities: StoreCapabilities,
    queries: Mutex<Vec<NativeQuery>>,
}

impl InMemoryLogStore {
    pub fn new(entity_type: &str, records: Vec<AuditRecord>) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            records,
            capabilities: StoreCapabilities::default(),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Advertise every optional capability.
    pub fn enhanced(mut self) -> Self {
        self.capabilities = StoreCapabilities {
            actor_label_search: true,
            context_lookup: true,
        };
        self
    }

    /// Queries received so far, `fetch` and `count` alike.
    pub fn queries(&self) -> Vec<NativeQuery> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    fn record_query(&self, query: &NativeQuery) {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
    }
}

impl AuditLogStore for InMemoryLogStore {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn capabilities(&self) -> StoreCapabilities {
        self.capabilities
    }

    fn fetch(&self, query: &NativeQuery) -> ChronicleResult<Vec<AuditRecord>> {
        self.record_query(query);
        Ok(query.apply(self.records.iter().cloned()))
    }

    fn count(&self, query: &NativeQuery) -> ChronicleResult<usize> {
        self.record_query(query);
        Ok(query.unpaginated().apply(self.records.iter().cloned()).len())
    }

    fn find(&self, id: i64) -> ChronicleResult<Option<AuditRecord>> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }
}

/// A store whose backend is always unreachable.
pub struct FailingStore {
    entity_type: String,
}

impl FailingStore {
    pub fn new(entity_type: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
        }
    }

    fn unavailable(&self) -> ChronicleError {
        ChronicleError::store_unavailable(&self.entity_type, "connection refused")
    }
}

impl AuditLogStore for FailingStore {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn fetch(&self, _query: &NativeQuery) -> ChronicleResult<Vec<AuditRecord>> {
        Err(self.unavailable())
    }

    fn count(&self, _query: &NativeQuery) -> ChronicleResult<usize> {
        Err(self.unavailable())
    }

    fn find(&self, _id: i64) -> ChronicleResult<Option<AuditRecord>> {
        Err(self.unavailable())
    }
}
