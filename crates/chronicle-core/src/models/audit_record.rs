use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChangeKind, ChangeSet};

/// One immutable entry in a per-entity-type append-only change log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Monotonic id, unique within its entity type's log only.
    pub id: i64,
    pub entity_type: String,
    pub subject_id: String,
    pub change_kind: ChangeKind,
    pub change_set: ChangeSet,
    /// Groups records written by one atomic write.
    pub correlation_hash: String,
    pub actor_id: Option<String>,
    pub actor_label: Option<String>,
    pub source_address: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Request id carried in the change set's context, if any.
    pub fn request_id(&self) -> Option<String> {
        self.change_set.context().and_then(|ctx| ctx.request_id)
    }

    /// Whether the record names no actor at all.
    pub fn is_actorless(&self) -> bool {
        self.actor_label.as_deref().map_or(true, str::is_empty)
    }
}
