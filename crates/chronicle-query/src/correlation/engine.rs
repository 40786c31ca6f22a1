//! CorrelationEngine: issues the same logical query against every
//! registered entity-type log and gathers the non-empty results.
//!
//! A failing log never aborts the scatter: it is logged and skipped, so
//! callers always get the best-effort partial result.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rayon::prelude::*;

use chronicle_core::config::TimelineConfig;
use chronicle_core::errors::ChronicleResult;
use chronicle_core::models::{AuditRecord, NativeFilter, NativeQuery, SortDirection, SortField};
use chronicle_core::AuditLogStore;

use crate::filter::RequestIdResolver;
use crate::registry::EntityLogRegistry;

/// Results grouped by entity type; types without matches are absent.
pub type Grouped = BTreeMap<String, Vec<AuditRecord>>;

pub struct CorrelationEngine {
    registry: Arc<EntityLogRegistry>,
    parallel: bool,
    default_window_minutes: i64,
}

impl CorrelationEngine {
    pub fn new(registry: Arc<EntityLogRegistry>, config: &TimelineConfig) -> Self {
        Self {
            registry,
            parallel: config.parallel_fan_out,
            default_window_minutes: config.default_window_minutes,
        }
    }

    pub fn registry(&self) -> &EntityLogRegistry {
        &self.registry
    }

    /// Every record written by one atomic write, newest first per type.
    pub fn find_by_correlation_id(&self, correlation_hash: &str) -> Grouped {
        let query = NativeQuery::new().filter(NativeFilter::CorrelationHash(correlation_hash.to_string()));
        self.scatter("correlation", |log| log.fetch(&query))
    }

    /// Every record whose `@context` carries the request id, newest first
    /// per type.
    pub fn find_by_request_id(&self, request_id: &str) -> Grouped {
        self.scatter("request_id", |log| records_for_request(log, request_id))
    }

    /// Request-id lookup within a single entity type. Errors surface.
    pub fn find_entity_records_by_request_id(
        &self,
        entity_type: &str,
        request_id: &str,
    ) -> ChronicleResult<Vec<AuditRecord>> {
        let log = self.registry.get(entity_type)?;
        records_for_request(log.as_ref(), request_id)
    }

    /// What one actor did within `window_minutes` either side of a moment,
    /// in narrative order. `None` (or an empty label) is the anonymous actor,
    /// which only ever matches actor-less records.
    pub fn find_actor_timeline(
        &self,
        actor_label: Option<&str>,
        occurred_at: DateTime<Utc>,
        window_minutes: i64,
        include_system: bool,
    ) -> Grouped {
        let (from, to) = window_bounds(occurred_at, window_minutes);
        self.timeline(actor_label, from, to, include_system)
    }

    /// What one actor did over an absolute range, in narrative order.
    pub fn find_global_timeline(
        &self,
        actor_label: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        include_system: bool,
    ) -> Grouped {
        self.timeline(Some(actor_label), from, to, include_system)
    }

    /// Actor timeline centred on a reference record. `window_minutes`
    /// defaults to the configured window.
    pub fn find_timeline_around(
        &self,
        record: &AuditRecord,
        window_minutes: Option<i64>,
        include_system: bool,
    ) -> Grouped {
        self.find_actor_timeline(
            record.actor_label.as_deref(),
            record.occurred_at,
            window_minutes.unwrap_or(self.default_window_minutes),
            include_system,
        )
    }

    fn timeline(
        &self,
        actor_label: Option<&str>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        include_system: bool,
    ) -> Grouped {
        let actor = actor_label.filter(|l| !l.is_empty());
        self.scatter("timeline", |log| actor_records(log, actor, from, to, include_system))
    }

    /// Run `op` against every registered log, sequentially or on the rayon
    /// pool, keeping only non-empty successes.
    fn scatter<F>(&self, op: &str, f: F) -> Grouped
    where
        F: Fn(&dyn AuditLogStore) -> ChronicleResult<Vec<AuditRecord>> + Sync,
    {
        let logs: Vec<(&str, &Arc<dyn AuditLogStore>)> = self.registry.logs().collect();
        let run = |&(entity_type, log): &(&str, &Arc<dyn AuditLogStore>)| {
            (entity_type.to_string(), f(log.as_ref()))
        };
        let results: Vec<(String, ChronicleResult<Vec<AuditRecord>>)> = if self.parallel {
            logs.par_iter().map(run).collect()
        } else {
            logs.iter().map(run).collect()
        };

        let mut grouped = Grouped::new();
        for (entity_type, result) in results {
            match result {
                Ok(records) if !records.is_empty() => {
                    grouped.insert(entity_type, records);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(entity_type = %entity_type, op, error = %e, "skipping entity type in scatter-gather");
                }
            }
        }
        grouped
    }
}

/// `window_minutes` either side of `at`, saturating instead of overflowing.
/// Bounds stay within four-digit years so they still order correctly as
/// stored RFC 3339 text.
fn window_bounds(at: DateTime<Utc>, window_minutes: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let window = Duration::try_minutes(window_minutes.saturating_abs()).unwrap_or(Duration::MAX);
    let earliest = Utc
        .with_ymd_and_hms(1, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let latest = Utc
        .with_ymd_and_hms(9999, 12, 31, 23, 59, 59)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let from = at.checked_sub_signed(window).map_or(earliest, |t| t.max(earliest));
    let to = at.checked_add_signed(window).map_or(latest, |t| t.min(latest));
    (from, to)
}

impl RequestIdResolver for CorrelationEngine {
    fn record_ids_for_request(&self, entity_type: &str, request_id: &str) -> ChronicleResult<HashSet<i64>> {
        Ok(self
            .find_entity_records_by_request_id(entity_type, request_id)?
            .into_iter()
            .map(|r| r.id)
            .collect())
    }
}

/// Native `@context` lookup when the store supports it, otherwise a scan.
fn records_for_request(log: &dyn AuditLogStore, request_id: &str) -> ChronicleResult<Vec<AuditRecord>> {
    if log.capabilities().context_lookup {
        return log.fetch(&NativeQuery::new().filter(NativeFilter::RequestId(request_id.to_string())));
    }
    Ok(log
        .fetch(&NativeQuery::new())?
        .into_iter()
        .filter(|r| r.request_id().as_deref() == Some(request_id))
        .collect())
}

fn narrative(filters: Vec<NativeFilter>) -> NativeQuery {
    NativeQuery {
        filters,
        ..NativeQuery::default()
    }
    .order_by(SortField::OccurredAt, SortDirection::Asc)
}

/// One log's share of an actor timeline, ordered occurredAt asc, id asc.
fn actor_records(
    log: &dyn AuditLogStore,
    actor_label: Option<&str>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    include_system: bool,
) -> ChronicleResult<Vec<AuditRecord>> {
    let in_window = NativeFilter::OccurredBetween { from, to };

    let Some(label) = actor_label else {
        return log.fetch(&narrative(vec![in_window, NativeFilter::Actorless]));
    };

    if !log.capabilities().actor_label_search {
        let query = narrative(vec![in_window]);
        return Ok(log
            .fetch(&query)?
            .into_iter()
            .filter(|r| label_matches(r, label) || (include_system && r.is_actorless()))
            .collect());
    }

    let mut records = log.fetch(&narrative(vec![
        in_window.clone(),
        NativeFilter::ActorLabelIgnoreCase(label.to_string()),
    ]))?;
    if include_system {
        records.extend(log.fetch(&narrative(vec![in_window, NativeFilter::Actorless]))?);
        records.sort_by(|a, b| (a.occurred_at, a.id).cmp(&(b.occurred_at, b.id)));
    }
    Ok(records)
}

fn label_matches(record: &AuditRecord, label: &str) -> bool {
    record
        .actor_label
        .as_deref()
        .is_some_and(|l| l.to_lowercase() == label.to_lowercase())
}
