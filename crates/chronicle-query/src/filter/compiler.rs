//! FilterCompiler: one entity type's paginated query surface.
//!
//! Filters the backing store evaluates natively are pushed down together
//! with ordering and pagination. As soon as one requested filter can only
//! be evaluated in memory, the whole unpaginated candidate set is fetched
//! and run through the [`Pipeline`] instead, so totals and page sizes stay
//! correct.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use chronicle_core::config::{ChronicleConfig, QueryConfig};
use chronicle_core::errors::ChronicleResult;
use chronicle_core::models::{
    AuditRecord, NativeFilter, NativeQuery, PaginatedResult, SortDirection, SortField,
};
use chronicle_core::AuditLogStore;

use super::criteria::{AuditFilters, SubjectMatch};
use super::dates::resolve_range;
use super::pipeline::{clamp_page, Pipeline};
use crate::actor::{SentinelHeuristic, SystemActorPredicate};

/// Resolves which records of one entity type belong to a request id.
pub trait RequestIdResolver: Send + Sync {
    fn record_ids_for_request(&self, entity_type: &str, request_id: &str) -> ChronicleResult<HashSet<i64>>;
}

pub struct FilterCompiler {
    log: Arc<dyn AuditLogStore>,
    config: QueryConfig,
    actor: Arc<dyn SystemActorPredicate>,
    request_ids: Option<Arc<dyn RequestIdResolver>>,
}

impl FilterCompiler {
    pub fn new(log: Arc<dyn AuditLogStore>, config: QueryConfig) -> Self {
        Self {
            log,
            config,
            actor: Arc::new(SentinelHeuristic::default()),
            request_ids: None,
        }
    }

    pub fn from_config(log: Arc<dyn AuditLogStore>, config: &ChronicleConfig) -> Self {
        Self::new(log, config.query.clone())
            .with_actor_predicate(Arc::new(SentinelHeuristic::from_config(&config.actor)))
    }

    /// Replace the system-actor rule used by `hide_system`.
    pub fn with_actor_predicate(mut self, actor: Arc<dyn SystemActorPredicate>) -> Self {
        self.actor = actor;
        self
    }

    /// Delegate request-id filtering, typically to a `CorrelationEngine`.
    pub fn with_request_id_resolver(mut self, resolver: Arc<dyn RequestIdResolver>) -> Self {
        self.request_ids = Some(resolver);
        self
    }

    pub fn entity_type(&self) -> &str {
        self.log.entity_type()
    }

    /// A single record by its log-local id.
    pub fn find(&self, id: i64) -> ChronicleResult<Option<AuditRecord>> {
        self.log.find(id)
    }

    /// Filtered, sorted, 1-based paginated query. Unknown sort fields fall
    /// back to `occurredAt desc`; only unparseable dates are errors.
    pub fn query(
        &self,
        search: &str,
        filters: &AuditFilters,
        sort_field: &str,
        sort_dir: &str,
        page: usize,
        page_size: usize,
    ) -> ChronicleResult<PaginatedResult<AuditRecord>> {
        self.query_at(search, filters, sort_field, sort_dir, page, page_size, Utc::now())
    }

    /// [`Self::query`] with an explicit "now" for open-ended date ranges.
    #[allow(clippy::too_many_arguments)]
    pub fn query_at(
        &self,
        search: &str,
        filters: &AuditFilters,
        sort_field: &str,
        sort_dir: &str,
        page: usize,
        page_size: usize,
        now: DateTime<Utc>,
    ) -> ChronicleResult<PaginatedResult<AuditRecord>> {
        let page_size = self.effective_page_size(page_size);
        let order = sort_order(sort_field, sort_dir);

        let mut native = NativeQuery::new();
        native.order = order;
        let mut pipeline = Pipeline::new();
        self.compile(search, filters, now, &mut native, &mut pipeline)?;
        let order = native.effective_order();

        if pipeline.is_empty() {
            self.push_down(native, page, page_size)
        } else {
            tracing::debug!(
                entity_type = %self.entity_type(),
                native_filters = native.filters.len(),
                memory_predicates = pipeline.len(),
                "query materializes candidate set"
            );
            let candidates = self.log.fetch(&native.unpaginated())?;
            if candidates.len() > self.config.materialization_warn_threshold {
                tracing::warn!(
                    entity_type = %self.entity_type(),
                    candidates = candidates.len(),
                    threshold = self.config.materialization_warn_threshold,
                    "large candidate set materialized; narrow the date range"
                );
            }
            Ok(pipeline.run(candidates, &order, page, page_size))
        }
    }

    fn push_down(
        &self,
        native: NativeQuery,
        page: usize,
        page_size: usize,
    ) -> ChronicleResult<PaginatedResult<AuditRecord>> {
        tracing::debug!(
            entity_type = %self.entity_type(),
            native_filters = native.filters.len(),
            "query pushed down to store"
        );
        let total_items = self.log.count(&native)?;
        if total_items == 0 {
            return Ok(PaginatedResult::empty(page_size));
        }
        let current_page = clamp_page(page, total_items, page_size);
        let items = self
            .log
            .fetch(&native.paginate(page_size, (current_page - 1) * page_size))?;
        Ok(PaginatedResult {
            items,
            total_items,
            current_page,
            page_size,
        })
    }

    /// Split the criteria into native filters and in-memory predicates.
    fn compile<'a>(
        &'a self,
        search: &str,
        filters: &'a AuditFilters,
        now: DateTime<Utc>,
        native: &mut NativeQuery,
        pipeline: &mut Pipeline<'a>,
    ) -> ChronicleResult<()> {
        let capabilities = self.log.capabilities();

        match &filters.subject {
            Some(SubjectMatch::Exact(id)) => native.filters.push(NativeFilter::SubjectIds(vec![id.clone()])),
            Some(matcher) => pipeline.push(move |r| matcher.matches(&r.subject_id)),
            None => {}
        }

        if !filters.change_kinds.is_empty() {
            native
                .filters
                .push(NativeFilter::ChangeKinds(filters.change_kinds.clone()));
        }

        if let Some(range) = &filters.occurred {
            let (from, to) = resolve_range(range, now)?;
            native.filters.push(NativeFilter::OccurredBetween { from, to });
        }

        if let Some(hash) = &filters.correlation_hash {
            native.filters.push(NativeFilter::CorrelationHash(hash.clone()));
        }

        if let Some(label) = &filters.actor_label {
            if !self.config.enhanced_actor_search {
                native.filters.push(NativeFilter::ActorLabel(label.clone()));
            } else if capabilities.actor_label_search {
                native.filters.push(NativeFilter::ActorLabelContains(label.clone()));
            } else {
                let needle = label.to_lowercase();
                pipeline.push(move |r| {
                    r.actor_label
                        .as_deref()
                        .is_some_and(|l| l.to_lowercase().contains(&needle))
                });
            }
        }

        if filters.hide_system {
            let actor = Arc::clone(&self.actor);
            pipeline.push(move |r| !actor.is_system_record(r));
        }

        if let Some(request_id) = &filters.request_id {
            match &self.request_ids {
                Some(resolver) => {
                    let ids = resolver.record_ids_for_request(self.entity_type(), request_id)?;
                    pipeline.push(move |r| ids.contains(&r.id));
                }
                None if capabilities.context_lookup => {
                    native.filters.push(NativeFilter::RequestId(request_id.clone()));
                }
                None => {
                    pipeline.push(move |r| r.request_id().as_deref() == Some(request_id.as_str()));
                }
            }
        }

        let search = search.trim();
        if !search.is_empty() {
            if self.config.intercept_global_search {
                let needle = search.to_lowercase();
                pipeline.push(move |r| global_match(r, &needle));
            } else {
                native.filters.push(NativeFilter::SubjectIds(vec![search.to_string()]));
            }
        }

        Ok(())
    }

    fn effective_page_size(&self, requested: usize) -> usize {
        if requested == 0 {
            self.config.default_page_size.max(1)
        } else {
            requested.min(self.config.max_page_size.max(1))
        }
    }
}

/// Allow-listed sort; anything else is the default order.
fn sort_order(field: &str, direction: &str) -> Vec<(SortField, SortDirection)> {
    match SortField::parse(field) {
        Some(field) => vec![(field, SortDirection::parse(direction))],
        None => vec![(SortField::OccurredAt, SortDirection::Desc)],
    }
}

/// Case-insensitive substring over subject id, actor label and correlation hash.
fn global_match(record: &AuditRecord, needle: &str) -> bool {
    record.subject_id.to_lowercase().contains(needle)
        || record.correlation_hash.to_lowercase().contains(needle)
        || record
            .actor_label
            .as_deref()
            .is_some_and(|l| l.to_lowercase().contains(needle))
}
