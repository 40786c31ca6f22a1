//! Flattening of grouped timeline results into one narrative list.

use std::collections::BTreeMap;

use serde::Serialize;

use chronicle_core::models::{AuditRecord, ChangeKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub entity_type: String,
    pub record: AuditRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedTimeline {
    pub entries: Vec<TimelineEntry>,
    /// Entity types present before filtering, sorted.
    pub entity_types: Vec<String>,
    /// Change kinds present before filtering, sorted by wire name.
    pub change_kinds: Vec<ChangeKind>,
}

/// Flatten, filter (empty filter sets keep everything), and re-sort by
/// (occurredAt asc, id asc).
pub fn merge_timeline(
    grouped: BTreeMap<String, Vec<AuditRecord>>,
    entity_filter: &[String],
    kind_filter: &[ChangeKind],
) -> MergedTimeline {
    let entity_types: Vec<String> = grouped.keys().cloned().collect();
    let mut change_kinds: Vec<ChangeKind> = grouped.values().flatten().map(|r| r.change_kind).collect();
    change_kinds.sort_by_key(|k| k.as_str());
    change_kinds.dedup();

    let mut entries: Vec<TimelineEntry> = grouped
        .into_iter()
        .filter(|(entity_type, _)| entity_filter.is_empty() || entity_filter.contains(entity_type))
        .flat_map(|(entity_type, records)| {
            records.into_iter().map(move |record| TimelineEntry {
                entity_type: entity_type.clone(),
                record,
            })
        })
        .filter(|entry| kind_filter.is_empty() || kind_filter.contains(&entry.record.change_kind))
        .collect();
    entries.sort_by(|a, b| {
        (a.record.occurred_at, a.record.id).cmp(&(b.record.occurred_at, b.record.id))
    });

    MergedTimeline {
        entries,
        entity_types,
        change_kinds,
    }
}
