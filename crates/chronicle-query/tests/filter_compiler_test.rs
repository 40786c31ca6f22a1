//! FilterCompiler against the golden order history, both on the in-process
//! store and on the SQLite reference store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use chronicle_core::config::QueryConfig;
use chronicle_core::models::{ChangeKind, NativeFilter};
use chronicle_core::{AuditLogStore, ChronicleError};
use chronicle_query::{AuditFilters, FilterCompiler, SystemActorPredicate};
use chronicle_storage::{NewAuditRecord, SqliteAuditStore};
use test_fixtures::{init_tracing, load_records, InMemoryLogStore, RecordBuilder};

const ORDER: &str = "App\\Entity\\Order";

fn order_store() -> Arc<InMemoryLogStore> {
    Arc::new(InMemoryLogStore::new(ORDER, load_records("audit/order_history.json")))
}

fn compiler(store: &Arc<InMemoryLogStore>) -> FilterCompiler {
    FilterCompiler::new(Arc::clone(store) as Arc<dyn AuditLogStore>, QueryConfig::default())
}

fn ids(result: &chronicle_core::PaginatedResult<chronicle_core::AuditRecord>) -> Vec<i64> {
    result.items.iter().map(|r| r.id).collect()
}

fn now() -> DateTime<Utc> {
    test_fixtures::ts("2024-06-01T00:00:00Z")
}

#[test]
fn unfiltered_query_pushes_everything_down() {
    let store = order_store();
    let result = compiler(&store)
        .query("", &AuditFilters::new(), "occurredAt", "desc", 1, 2)
        .unwrap();
    assert_eq!(result.total_items, 6);
    assert_eq!(ids(&result), vec![6, 5]);
    let last = store.queries().pop().unwrap();
    assert_eq!(last.limit, Some(2));
}

#[test]
fn five_matches_page_size_two_page_ten_returns_page_three() {
    let store = order_store();
    let filters = AuditFilters::new().change_kind(ChangeKind::Updated).change_kind(ChangeKind::Created);
    let result = compiler(&store).query("", &filters, "id", "asc", 10, 2).unwrap();
    assert_eq!(result.total_items, 5);
    assert_eq!(result.current_page, 3);
    assert_eq!(result.items.len(), 1);
    assert_eq!(ids(&result), vec![5]);
}

#[test]
fn hide_system_materializes_and_counts_correctly() {
    init_tracing();
    let store = order_store();
    let filters = AuditFilters::new().hide_system(true);
    let result = compiler(&store).query("", &filters, "id", "asc", 1, 10).unwrap();
    // 3: automation/nightly-reindex and 6: no actor are system.
    assert_eq!(ids(&result), vec![1, 2, 4, 5]);
    assert_eq!(result.total_items, 4);
    assert!(store.queries().iter().all(|q| q.limit.is_none()));
}

#[test]
fn hide_system_keeps_email_actor_with_empty_id() {
    let store = Arc::new(InMemoryLogStore::new(
        ORDER,
        vec![
            RecordBuilder::new(ORDER, 1, "1").actor(Some("automation"), Some("nightly-reindex")).build(),
            RecordBuilder::new(ORDER, 2, "1").actor(Some(""), Some("ops@example.com")).build(),
        ],
    ));
    let result = compiler(&store)
        .query("", &AuditFilters::new().hide_system(true), "id", "asc", 1, 10)
        .unwrap();
    assert_eq!(ids(&result), vec![2]);
}

#[test]
fn custom_actor_predicate_replaces_heuristic() {
    let store = order_store();
    let nobody_is_system: Arc<dyn SystemActorPredicate> = Arc::new(|_: Option<&str>, _: Option<&str>| false);
    let result = compiler(&store)
        .with_actor_predicate(nobody_is_system)
        .query("", &AuditFilters::new().hide_system(true), "id", "asc", 1, 10)
        .unwrap();
    assert_eq!(result.total_items, 6);
}

#[test]
fn wildcard_subject_is_evaluated_in_memory() {
    let store = Arc::new(InMemoryLogStore::new(
        ORDER,
        vec![
            RecordBuilder::new(ORDER, 1, "70").build(),
            RecordBuilder::new(ORDER, 2, "17").build(),
            RecordBuilder::new(ORDER, 3, "7").build(),
        ],
    ));
    let c = compiler(&store);
    let prefix = c.query("", &AuditFilters::new().subject("7*"), "id", "asc", 1, 10).unwrap();
    assert_eq!(ids(&prefix), vec![1, 3]);
    let contains = c.query("", &AuditFilters::new().subject("*7*"), "id", "asc", 1, 10).unwrap();
    assert_eq!(ids(&contains), vec![1, 2, 3]);
    let exact = c.query("", &AuditFilters::new().subject("7"), "id", "asc", 1, 10).unwrap();
    assert_eq!(ids(&exact), vec![3]);
}

#[test]
fn date_range_bounds_are_inclusive_and_date_only_to_covers_the_day() {
    let store = order_store();
    let filters = AuditFilters::new().occurred_between(Some("2024-01-10"), Some("2024-01-10"));
    let result = compiler(&store)
        .query_at("", &filters, "id", "asc", 1, 10, now())
        .unwrap();
    assert_eq!(ids(&result), vec![2, 3]);
}

#[test]
fn open_ended_range_defaults() {
    let store = order_store();
    let filters = AuditFilters::new().occurred_between(Some("2024-01-12"), None);
    let result = compiler(&store)
        .query_at("", &filters, "id", "asc", 1, 10, now())
        .unwrap();
    assert_eq!(ids(&result), vec![4, 5, 6]);
}

#[test]
fn unparseable_date_is_a_data_format_error() {
    let store = order_store();
    let filters = AuditFilters::new().occurred_between(Some("yesterday-ish"), None);
    let err = compiler(&store).query("", &filters, "id", "asc", 1, 10).unwrap_err();
    assert!(matches!(err, ChronicleError::DataFormat { .. }));
}

#[test]
fn invalid_sort_falls_back_to_newest_first() {
    let store = order_store();
    let result = compiler(&store)
        .query("", &AuditFilters::new(), "diffs", "asc", 1, 3)
        .unwrap();
    assert_eq!(ids(&result), vec![6, 5, 4]);
}

#[test]
fn enhanced_actor_search_without_capability_is_substring_in_memory() {
    let store = order_store();
    let result = compiler(&store)
        .query("", &AuditFilters::new().actor_label("ALICE"), "id", "asc", 1, 10)
        .unwrap();
    assert_eq!(ids(&result), vec![1, 2]);
}

#[test]
fn enhanced_actor_search_with_capability_is_pushed_down() {
    let store = Arc::new(
        InMemoryLogStore::new(ORDER, load_records("audit/order_history.json")).enhanced(),
    );
    let result = compiler(&store)
        .query("", &AuditFilters::new().actor_label("example"), "id", "asc", 1, 10)
        .unwrap();
    assert_eq!(ids(&result), vec![1, 2, 4]);
    let last = store.queries().pop().unwrap();
    assert!(last.filters.contains(&NativeFilter::ActorLabelContains("example".into())));
    assert_eq!(last.limit, Some(10));
}

#[test]
fn plain_actor_search_is_exact() {
    let store = order_store();
    let config = QueryConfig {
        enhanced_actor_search: false,
        ..QueryConfig::default()
    };
    let c = FilterCompiler::new(Arc::clone(&store) as Arc<dyn AuditLogStore>, config);
    let result = c.query("", &AuditFilters::new().actor_label("alice"), "id", "asc", 1, 10).unwrap();
    assert!(result.items.is_empty());
    assert_eq!(result.current_page, 1);
}

#[test]
fn global_search_intercepted_matches_several_columns() {
    let store = order_store();
    let c = compiler(&store);
    let by_hash = c.query("H3", &AuditFilters::new(), "id", "asc", 1, 10).unwrap();
    assert_eq!(ids(&by_hash), vec![3]);
    let by_actor = c.query("nightly", &AuditFilters::new(), "id", "asc", 1, 10).unwrap();
    assert_eq!(ids(&by_actor), vec![3]);
}

#[test]
fn global_search_not_intercepted_is_exact_subject() {
    let store = order_store();
    let config = QueryConfig {
        intercept_global_search: false,
        ..QueryConfig::default()
    };
    let c = FilterCompiler::new(Arc::clone(&store) as Arc<dyn AuditLogStore>, config);
    let result = c.query("8", &AuditFilters::new(), "id", "asc", 1, 10).unwrap();
    assert_eq!(ids(&result), vec![3]);
    assert!(c.query("h3", &AuditFilters::new(), "id", "asc", 1, 10).unwrap().items.is_empty());
}

#[test]
fn request_id_without_resolver_scans_context() {
    let store = order_store();
    let result = compiler(&store)
        .query("", &AuditFilters::new().request_id("req-42"), "id", "asc", 1, 10)
        .unwrap();
    assert_eq!(ids(&result), vec![2]);
}

#[test]
fn page_size_zero_uses_default_and_oversize_is_clamped() {
    let store = order_store();
    let c = compiler(&store);
    assert_eq!(c.query("", &AuditFilters::new(), "", "", 1, 0).unwrap().page_size, 50);
    assert_eq!(c.query("", &AuditFilters::new(), "", "", 1, 5_000).unwrap().page_size, 1_000);
}

#[test]
fn find_by_identity() {
    let store = order_store();
    let c = compiler(&store);
    assert_eq!(c.find(4).unwrap().unwrap().subject_id, "7");
    assert!(c.find(40).unwrap().is_none());
}

#[test]
fn loose_parameter_map_drives_the_same_query() {
    let store = order_store();
    let params = json!({
        "type": "update",
        "created_at": {"from": "2024-01-10", "to": "2024-01-12"},
        "unknown": 5
    });
    let filters = AuditFilters::from_map(params.as_object().unwrap());
    let result = compiler(&store).query("", &filters, "created_at", "ASC", 1, 10).unwrap();
    assert_eq!(ids(&result), vec![2, 3, 4, 5]);
}

#[test]
fn identical_queries_are_deterministic() {
    let store = order_store();
    let c = compiler(&store);
    let filters = AuditFilters::new().hide_system(true);
    let a = c.query("7", &filters, "subjectId", "asc", 1, 2).unwrap();
    let b = c.query("7", &filters, "subjectId", "asc", 1, 2).unwrap();
    assert_eq!(a, b);
}

#[test]
fn sqlite_store_agrees_with_in_process_store() {
    let sqlite = SqliteAuditStore::open_in_memory().unwrap();
    let mut fixtures = load_records("audit/order_history.json");
    fixtures.push(
        RecordBuilder::new(ORDER, 7, "11")
            .actor(Some("31"), Some("ÉLODIE@example.com"))
            .at("2024-01-13T08:00:00Z")
            .hash("h7")
            .build(),
    );
    for r in &fixtures {
        sqlite
            .append(
                &NewAuditRecord::new(ORDER, &r.subject_id, r.change_kind, serde_json::to_value(&r.change_set).unwrap())
                    .actor(r.actor_id.as_deref(), r.actor_label.as_deref())
                    .at(r.occurred_at)
                    .correlated(&r.correlation_hash),
            )
            .unwrap();
    }
    let log: Arc<dyn AuditLogStore> = sqlite.log(ORDER).unwrap();
    let on_disk = FilterCompiler::new(log, QueryConfig::default());
    let memory = Arc::new(InMemoryLogStore::new(ORDER, fixtures));
    let in_process = compiler(&memory);

    let cases = vec![
        AuditFilters::new(),
        AuditFilters::new().hide_system(true),
        AuditFilters::new().actor_label("alice"),
        AuditFilters::new().actor_label("élodie"),
        AuditFilters::new().actor_label("ÉLODIE@EXAMPLE.COM"),
        AuditFilters::new().request_id("req-42"),
        AuditFilters::new().subject("7").change_kind(ChangeKind::Updated),
        AuditFilters::new().occurred_between(Some("2024-01-10"), None),
    ];
    for filters in cases {
        let a = on_disk.query_at("", &filters, "id", "asc", 1, 3, now()).unwrap();
        let b = in_process.query_at("", &filters, "id", "asc", 1, 3, now()).unwrap();
        assert_eq!(ids(&a), ids(&b), "{filters:?}");
        assert_eq!(a.total_items, b.total_items, "{filters:?}");
    }

    let folded = on_disk
        .query_at("", &AuditFilters::new().actor_label("élodie"), "id", "asc", 1, 10, now())
        .unwrap();
    assert_eq!(ids(&folded), vec![7]);
}
