//! Scatter-gather correlation over several entity-type logs.

use std::sync::Arc;

use chronicle_core::config::{QueryConfig, TimelineConfig};
use chronicle_core::models::ChangeKind;
use chronicle_core::AuditLogStore;
use chronicle_query::{merge_timeline, AuditFilters, CorrelationEngine, EntityLogRegistry, FilterCompiler};
use chronicle_storage::{NewAuditRecord, SqliteAuditStore};
use test_fixtures::{init_tracing, load_records, ts, FailingStore, InMemoryLogStore};

const ORDER: &str = "App\\Entity\\Order";
const INVOICE: &str = "App\\Entity\\Invoice";

fn registry(with_failing: bool) -> Arc<EntityLogRegistry> {
    let mut logs: Vec<Arc<dyn AuditLogStore>> = vec![
        Arc::new(InMemoryLogStore::new(ORDER, load_records("audit/order_history.json"))),
        Arc::new(InMemoryLogStore::new(INVOICE, load_records("audit/invoice_history.json"))),
    ];
    if with_failing {
        logs.push(Arc::new(FailingStore::new("App\\Entity\\Shipment")));
    }
    Arc::new(EntityLogRegistry::from_logs(logs))
}

fn engine(with_failing: bool, parallel: bool) -> CorrelationEngine {
    let config = TimelineConfig {
        parallel_fan_out: parallel,
        ..TimelineConfig::default()
    };
    CorrelationEngine::new(registry(with_failing), &config)
}

fn ids(records: &[chronicle_core::AuditRecord]) -> Vec<i64> {
    records.iter().map(|r| r.id).collect()
}

#[test]
fn correlation_hash_groups_records_across_types() {
    let grouped = engine(false, true).find_by_correlation_id("h2");
    assert_eq!(grouped.len(), 2);
    assert_eq!(ids(&grouped[ORDER]), vec![2]);
    // Same timestamp: id desc.
    assert_eq!(ids(&grouped[INVOICE]), vec![2, 1]);
}

#[test]
fn types_without_matches_are_absent() {
    let grouped = engine(false, false).find_by_correlation_id("h5");
    assert_eq!(grouped.keys().collect::<Vec<_>>(), vec![ORDER]);
    assert!(engine(false, false).find_by_correlation_id("nope").is_empty());
}

#[test]
fn one_failing_store_is_skipped_not_fatal() {
    init_tracing();
    for parallel in [true, false] {
        let grouped = engine(true, parallel).find_by_correlation_id("h2");
        assert_eq!(grouped.len(), 2, "parallel={parallel}");
        assert!(!grouped.contains_key("App\\Entity\\Shipment"));
    }
}

#[test]
fn request_id_scatter_and_single_type_lookup() {
    let e = engine(true, true);
    let grouped = e.find_by_request_id("req-42");
    assert_eq!(ids(&grouped[ORDER]), vec![2]);
    assert_eq!(ids(&grouped[INVOICE]), vec![1]);

    let single = e.find_entity_records_by_request_id(INVOICE, "req-42").unwrap();
    assert_eq!(ids(&single), vec![1]);
    assert!(e.find_entity_records_by_request_id("App\\Entity\\Shipment", "req-42").is_err());
    assert!(e.find_entity_records_by_request_id("App\\Unknown", "req-42").is_err());
}

#[test]
fn actor_timeline_window_is_case_insensitive_and_narrative() {
    let grouped = engine(false, true).find_actor_timeline(
        Some("alice@example.com"),
        ts("2024-01-10T12:01:00Z"),
        5,
        false,
    );
    assert_eq!(ids(&grouped[ORDER]), vec![2]);
    // "Alice@Example.com" matches case-insensitively; ascending by id on ties.
    assert_eq!(ids(&grouped[INVOICE]), vec![1, 2]);
}

#[test]
fn actor_timeline_can_include_actorless_records() {
    let e = engine(false, true);
    let without = e.find_actor_timeline(Some("alice@example.com"), ts("2024-01-10T12:01:00Z"), 5, false);
    assert_eq!(ids(&without[INVOICE]), vec![1, 2]);
    let with = e.find_actor_timeline(Some("alice@example.com"), ts("2024-01-10T12:01:00Z"), 5, true);
    // Invoice #3 has no actor and falls in the window.
    assert_eq!(ids(&with[INVOICE]), vec![1, 2, 3]);
    // The automation record has a label, so it is never "system" here.
    assert_eq!(ids(&with[ORDER]), vec![2]);
}

#[test]
fn anonymous_reference_only_matches_actorless_records() {
    let e = engine(false, true);
    for include_system in [false, true] {
        let grouped = e.find_actor_timeline(None, ts("2024-01-12T10:00:00Z"), 5, include_system);
        assert_eq!(ids(&grouped[ORDER]), vec![6]);
        assert!(!grouped.contains_key(INVOICE));
    }
}

#[test]
fn timeline_around_reference_record_uses_its_actor_and_time() {
    let e = engine(false, true);
    let reference = load_records("audit/order_history.json").remove(1);
    let grouped = e.find_timeline_around(&reference, None, false);
    assert_eq!(ids(&grouped[ORDER]), vec![2]);
    assert_eq!(ids(&grouped[INVOICE]), vec![1, 2]);

    let anonymous = load_records("audit/order_history.json").remove(5);
    let grouped = e.find_timeline_around(&anonymous, Some(1), true);
    assert_eq!(ids(&grouped[ORDER]), vec![6]);
}

#[test]
fn global_timeline_then_merge() {
    let e = engine(true, true);
    let grouped = e.find_global_timeline(
        "alice@example.com",
        ts("2024-01-01T00:00:00Z"),
        ts("2024-01-31T00:00:00Z"),
        false,
    );
    let merged = merge_timeline(grouped, &[], &[]);
    let order: Vec<(&str, i64)> = merged
        .entries
        .iter()
        .map(|e| (e.entity_type.as_str(), e.record.id))
        .collect();
    assert_eq!(
        order,
        vec![(ORDER, 1), (INVOICE, 1), (ORDER, 2), (INVOICE, 2)]
    );
    assert_eq!(merged.change_kinds, vec![ChangeKind::Associated, ChangeKind::Created, ChangeKind::Updated]);

    let only_orders = merge_timeline(
        e.find_global_timeline("alice@example.com", ts("2024-01-01T00:00:00Z"), ts("2024-01-31T00:00:00Z"), false),
        &[ORDER.to_string()],
        &[],
    );
    assert_eq!(only_orders.entries.len(), 2);
}

#[test]
fn filter_compiler_delegates_request_id_to_engine() {
    let registry = registry(false);
    let e = Arc::new(CorrelationEngine::new(Arc::clone(&registry), &TimelineConfig::default()));
    let compiler = FilterCompiler::new(registry.get(INVOICE).unwrap(), QueryConfig::default())
        .with_request_id_resolver(e);
    let result = compiler
        .query("", &AuditFilters::new().request_id("req-42"), "id", "asc", 1, 10)
        .unwrap();
    assert_eq!(ids(&result.items), vec![1]);
    assert_eq!(result.total_items, 1);
}

#[test]
fn sqlite_backed_scatter_uses_native_lookups() {
    let store = SqliteAuditStore::open_in_memory().unwrap();
    store
        .append_batch(&[
            NewAuditRecord::new(ORDER, "7", ChangeKind::Updated, serde_json::json!({
                "status": {"old": "draft", "new": "paid"},
                "@context": {"request_id": "req-9"}
            }))
            .actor(Some("1"), Some("Carol@example.com"))
            .at(ts("2024-02-01T10:00:00Z")),
            NewAuditRecord::new(INVOICE, "55", ChangeKind::Created, serde_json::json!({"class": "Invoice", "label": "55"}))
                .actor(Some("1"), Some("carol@example.com"))
                .at(ts("2024-02-01T10:00:00Z")),
        ])
        .unwrap();
    let registry = Arc::new(EntityLogRegistry::from_logs(store.logs().unwrap()));
    let e = CorrelationEngine::new(registry, &TimelineConfig::default());

    let order = store.log(ORDER).unwrap().find(1).unwrap().unwrap();
    let by_hash = e.find_by_correlation_id(&order.correlation_hash);
    assert_eq!(by_hash.len(), 2);

    let by_request = e.find_by_request_id("req-9");
    assert_eq!(by_request.keys().collect::<Vec<_>>(), vec![ORDER]);

    let timeline = e.find_actor_timeline(Some("CAROL@example.com"), ts("2024-02-01T10:02:00Z"), 5, false);
    assert_eq!(timeline.len(), 2);
}

#[test]
fn extreme_windows_saturate_instead_of_panicking() {
    let e = engine(false, true);
    for minutes in [i64::MIN, i64::MAX, 1_000_000_000_000] {
        let grouped = e.find_actor_timeline(Some("alice@example.com"), ts("2024-01-10T12:01:00Z"), minutes, false);
        assert_eq!(ids(&grouped[ORDER]), vec![1, 2], "{minutes}");
        assert_eq!(ids(&grouped[INVOICE]), vec![1, 2], "{minutes}");
    }
}

#[test]
fn sqlite_timelines_fold_non_ascii_labels() {
    let store = SqliteAuditStore::open_in_memory().unwrap();
    store
        .append_batch(&[
            NewAuditRecord::new(ORDER, "7", ChangeKind::Updated, serde_json::json!({"status": {"old": "draft", "new": "paid"}}))
                .actor(Some("31"), Some("ÉLODIE@example.com"))
                .at(ts("2024-02-01T10:00:00Z")),
            NewAuditRecord::new(INVOICE, "55", ChangeKind::Created, serde_json::json!({"class": "Invoice", "label": "55"}))
                .actor(Some("32"), Some("elodie@example.com"))
                .at(ts("2024-02-01T10:01:00Z")),
        ])
        .unwrap();
    let registry = Arc::new(EntityLogRegistry::from_logs(store.logs().unwrap()));
    let e = CorrelationEngine::new(registry, &TimelineConfig::default());

    let timeline = e.find_actor_timeline(Some("élodie@example.com"), ts("2024-02-01T10:02:00Z"), 5, false);
    assert_eq!(timeline.keys().collect::<Vec<_>>(), vec![ORDER]);
    assert_eq!(ids(&timeline[ORDER]), vec![1]);

    for minutes in [i64::MIN, 1_000_000_000_000] {
        let wide = e.find_actor_timeline(Some("Élodie@Example.com"), ts("2024-02-01T10:02:00Z"), minutes, false);
        assert_eq!(ids(&wide[ORDER]), vec![1], "{minutes}");
    }
}
