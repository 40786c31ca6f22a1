//! Native query model shared by every backing store, plus pagination results.
//!
//! A [`NativeQuery`] only carries the primitives a per-entity-type store is
//! expected to evaluate itself. Filters that need in-memory evaluation live
//! in the query crate.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AuditRecord, ChangeKind};

/// Allow-listed sort columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Id,
    SubjectId,
    ChangeKind,
    OccurredAt,
}

impl SortField {
    /// Parse a caller-supplied sort field. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "id" => Some(SortField::Id),
            "subjectId" | "subject_id" | "object_id" | "objectId" | "entityId" => {
                Some(SortField::SubjectId)
            }
            "changeKind" | "change_kind" | "type" => Some(SortField::ChangeKind),
            "occurredAt" | "occurred_at" | "created_at" | "createdAt" => Some(SortField::OccurredAt),
            _ => None,
        }
    }

    fn compare(&self, a: &AuditRecord, b: &AuditRecord) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::SubjectId => a.subject_id.cmp(&b.subject_id),
            SortField::ChangeKind => a.change_kind.as_str().cmp(b.change_kind.as_str()),
            SortField::OccurredAt => a.occurred_at.cmp(&b.occurred_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive `asc`/`desc`; anything else is descending.
    pub fn parse(direction: &str) -> Self {
        if direction.trim().eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }
}

/// Filter primitives a backing store evaluates natively.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeFilter {
    Id(i64),
    /// Exact match, or IN when several ids are given.
    SubjectIds(Vec<String>),
    ChangeKinds(Vec<ChangeKind>),
    /// Inclusive on both ends.
    OccurredBetween {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    CorrelationHash(String),
    /// Case-sensitive exact actor label.
    ActorLabel(String),
    /// Case-insensitive exact actor label. Requires `actor_label_search`.
    ActorLabelIgnoreCase(String),
    /// Case-insensitive substring. Requires `actor_label_search`.
    ActorLabelContains(String),
    /// Records with no actor label.
    Actorless,
    /// `"@context".requestId` equals the value. Requires `context_lookup`.
    RequestId(String),
}

impl NativeFilter {
    /// Reference semantics of each primitive, used by stores that evaluate
    /// filters in process.
    pub fn matches(&self, record: &AuditRecord) -> bool {
        match self {
            NativeFilter::Id(id) => record.id == *id,
            NativeFilter::SubjectIds(ids) => ids.iter().any(|id| *id == record.subject_id),
            NativeFilter::ChangeKinds(kinds) => kinds.contains(&record.change_kind),
            NativeFilter::OccurredBetween { from, to } => {
                record.occurred_at >= *from && record.occurred_at <= *to
            }
            NativeFilter::CorrelationHash(hash) => record.correlation_hash == *hash,
            NativeFilter::ActorLabel(label) => record.actor_label.as_deref() == Some(label.as_str()),
            NativeFilter::ActorLabelIgnoreCase(label) => record
                .actor_label
                .as_deref()
                .is_some_and(|l| l.to_lowercase() == label.to_lowercase()),
            NativeFilter::ActorLabelContains(term) => record
                .actor_label
                .as_deref()
                .is_some_and(|l| l.to_lowercase().contains(&term.to_lowercase())),
            NativeFilter::Actorless => record.is_actorless(),
            NativeFilter::RequestId(request_id) => {
                record.request_id().as_deref() == Some(request_id.as_str())
            }
        }
    }
}

/// Optional capabilities a backing store may advertise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCapabilities {
    /// Case-insensitive exact and substring matching on the actor label.
    pub actor_label_search: bool,
    /// Structured lookup into `"@context"`.
    pub context_lookup: bool,
}

/// A store-level query: conjunctive filters, ordering, optional limit/offset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeQuery {
    pub filters: Vec<NativeFilter>,
    /// Empty means the default order: occurredAt desc, id desc.
    pub order: Vec<(SortField, SortDirection)>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl NativeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: NativeFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: SortField, direction: SortDirection) -> Self {
        self.order.push((field, direction));
        self
    }

    pub fn paginate(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    /// Same query without limit/offset.
    pub fn unpaginated(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            order: self.order.clone(),
            limit: None,
            offset: 0,
        }
    }

    /// Effective ordering, with the default applied and `id` appended as the
    /// final tie-breaker so results are deterministic.
    pub fn effective_order(&self) -> Vec<(SortField, SortDirection)> {
        let mut order = if self.order.is_empty() {
            vec![(SortField::OccurredAt, SortDirection::Desc)]
        } else {
            self.order.clone()
        };
        if !order.iter().any(|(field, _)| *field == SortField::Id) {
            let tie = order.last().map_or(SortDirection::Desc, |(_, dir)| *dir);
            order.push((SortField::Id, tie));
        }
        order
    }

    pub fn matches(&self, record: &AuditRecord) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }

    /// Evaluate the whole query over an in-process record set.
    pub fn apply(&self, records: impl IntoIterator<Item = AuditRecord>) -> Vec<AuditRecord> {
        let mut matched: Vec<AuditRecord> = records.into_iter().filter(|r| self.matches(r)).collect();
        let order = self.effective_order();
        matched.sort_by(|a, b| compare_records(&order, a, b));
        let limit = self.limit.unwrap_or(usize::MAX);
        matched.into_iter().skip(self.offset).take(limit).collect()
    }
}

/// Compare two records under an ordering.
pub fn compare_records(
    order: &[(SortField, SortDirection)],
    a: &AuditRecord,
    b: &AuditRecord,
) -> Ordering {
    for (field, direction) in order {
        let ord = field.compare(a, b);
        let ord = match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total_items: usize,
    /// 1-based.
    pub current_page: usize,
    pub page_size: usize,
}

impl<T> PaginatedResult<T> {
    pub fn empty(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
            current_page: 1,
            page_size,
        }
    }

    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total_items.div_ceil(self.page_size)
    }
}
