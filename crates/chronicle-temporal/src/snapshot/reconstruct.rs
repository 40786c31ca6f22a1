//! Snapshot reconstruction: current state + backward replay.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use chronicle_core::errors::ChronicleResult;
use chronicle_core::models::{
    ChangeKind, FieldValue, NativeFilter, NativeQuery, SortDirection, SortField, TypeDescriptor,
};
use chronicle_core::{ChronicleError, FieldAccessor};
use chronicle_query::EntityLogRegistry;

use super::coerce::coerce;
use super::collection::reverse_collection;

/// subjectId → field name → value.
pub type Snapshot = BTreeMap<String, BTreeMap<String, FieldValue>>;

pub struct SnapshotReconstructor {
    registry: Arc<EntityLogRegistry>,
}

impl SnapshotReconstructor {
    pub fn new(registry: Arc<EntityLogRegistry>) -> Self {
        Self { registry }
    }

    /// Field values of `entities` as they were at `as_of`.
    pub fn reconstruct<A: FieldAccessor>(
        &self,
        accessor: &A,
        entities: &[A::Entity],
        as_of: DateTime<Utc>,
        fields: &[&str],
    ) -> ChronicleResult<Snapshot> {
        self.reconstruct_at(accessor, entities, as_of, fields, Utc::now())
    }

    /// Reconstruct with an explicit "now".
    ///
    /// Algorithm:
    /// 1. Read the current values through the accessor as the baseline
    /// 2. If `as_of` is not in the past, the baseline is the answer
    /// 3. Fetch every update to these subjects in `[as_of, now]`, newest first
    /// 4. Undo each one: scalar fields take the recorded old value, collection
    ///    fields drop the members the update added
    pub fn reconstruct_at<A: FieldAccessor>(
        &self,
        accessor: &A,
        entities: &[A::Entity],
        as_of: DateTime<Utc>,
        fields: &[&str],
        now: DateTime<Utc>,
    ) -> ChronicleResult<Snapshot> {
        let Some(first) = entities.first() else {
            return Ok(Snapshot::new());
        };
        let entity_type = accessor.entity_type(first);
        for entity in &entities[1..] {
            let found = accessor.entity_type(entity);
            if found != entity_type {
                return Err(ChronicleError::TypeMismatch {
                    expected: entity_type,
                    found,
                });
            }
        }

        let types = field_types(accessor, &entity_type, fields);
        let mut snapshot = baseline(accessor, entities, fields);
        if as_of >= now {
            return Ok(snapshot);
        }

        let log = self.registry.get(&entity_type)?;
        let query = NativeQuery::new()
            .filter(NativeFilter::SubjectIds(snapshot.keys().cloned().collect()))
            .filter(NativeFilter::ChangeKinds(vec![ChangeKind::Updated]))
            .filter(NativeFilter::OccurredBetween { from: as_of, to: now })
            .order_by(SortField::OccurredAt, SortDirection::Desc)
            .order_by(SortField::Id, SortDirection::Desc);
        let updates = log.fetch(&query)?;
        tracing::debug!(
            entity_type = %entity_type,
            subjects = snapshot.len(),
            updates = updates.len(),
            "replaying updates backward"
        );

        for record in &updates {
            let Some(values) = snapshot.get_mut(&record.subject_id) else {
                continue;
            };
            for (name, change) in record.change_set.fields() {
                let Some(ty) = types.get(name) else {
                    continue;
                };
                if ty.is_collection() {
                    let current = values.get(name).cloned().unwrap_or(FieldValue::Null);
                    values.insert(name.to_string(), reverse_collection(&current, &change));
                } else if let Some(old) = change.old_value() {
                    values.insert(name.to_string(), coerce(old, ty));
                }
            }
        }
        Ok(snapshot)
    }
}

/// Declared type per requested field; unknown fields are untyped.
fn field_types<A: FieldAccessor>(
    accessor: &A,
    entity_type: &str,
    fields: &[&str],
) -> HashMap<String, TypeDescriptor> {
    fields
        .iter()
        .map(|&name| {
            let ty = accessor.field_type(entity_type, name).unwrap_or_else(|| {
                tracing::debug!(entity_type, field = name, "unknown field, values pass through untyped");
                TypeDescriptor::Untyped
            });
            (name.to_string(), ty)
        })
        .collect()
}

fn baseline<A: FieldAccessor>(accessor: &A, entities: &[A::Entity], fields: &[&str]) -> Snapshot {
    entities
        .iter()
        .map(|entity| {
            let values = fields
                .iter()
                .map(|&name| {
                    let value = accessor.get_field(entity, name).unwrap_or(FieldValue::Null);
                    (name.to_string(), value)
                })
                .collect();
            (accessor.subject_id(entity), values)
        })
        .collect()
}
