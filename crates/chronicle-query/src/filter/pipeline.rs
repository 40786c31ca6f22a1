//! Pure in-memory query pipeline: candidates → predicate chain → count →
//! page slice. Backend-independent.

use chronicle_core::models::query::compare_records;
use chronicle_core::models::{AuditRecord, PaginatedResult, SortDirection, SortField};

pub type RecordPredicate<'a> = Box<dyn Fn(&AuditRecord) -> bool + Send + Sync + 'a>;

/// Conjunction of in-memory predicates.
#[derive(Default)]
pub struct Pipeline<'a> {
    predicates: Vec<RecordPredicate<'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    pub fn push(&mut self, predicate: impl Fn(&AuditRecord) -> bool + Send + Sync + 'a) {
        self.predicates.push(Box::new(predicate));
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn matches(&self, record: &AuditRecord) -> bool {
        self.predicates.iter().all(|p| p(record))
    }

    /// Filter, order, count, and cut one page out of a candidate set.
    pub fn run(
        &self,
        candidates: impl IntoIterator<Item = AuditRecord>,
        order: &[(SortField, SortDirection)],
        page: usize,
        page_size: usize,
    ) -> PaginatedResult<AuditRecord> {
        let mut matched: Vec<AuditRecord> = candidates.into_iter().filter(|r| self.matches(r)).collect();
        matched.sort_by(|a, b| compare_records(order, a, b));
        paginate(matched, page, page_size)
    }
}

/// Clamp a requested 1-based page to `[1, ceil(total / page_size)]`, or 1
/// when nothing matched.
pub fn clamp_page(requested: usize, total: usize, page_size: usize) -> usize {
    let page = requested.max(1);
    if page_size == 0 {
        return 1;
    }
    let total_pages = total.div_ceil(page_size);
    if total_pages > 0 && page > total_pages {
        total_pages
    } else if total_pages == 0 {
        1
    } else {
        page
    }
}

/// Slice an ordered, fully-filtered set into one page.
pub fn paginate(items: Vec<AuditRecord>, page: usize, page_size: usize) -> PaginatedResult<AuditRecord> {
    let total_items = items.len();
    let current_page = clamp_page(page, total_items, page_size);
    let offset = (current_page - 1) * page_size;
    let items = items.into_iter().skip(offset).take(page_size).collect();
    PaginatedResult {
        items,
        total_items,
        current_page,
        page_size,
    }
}
