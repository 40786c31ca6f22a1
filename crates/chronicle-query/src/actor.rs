//! Human vs automated actor classification for the "hide system" filter.

use chronicle_core::config::ActorConfig;
use chronicle_core::models::AuditRecord;

/// Decides whether an (actorId, actorLabel) pair denotes automated execution.
pub trait SystemActorPredicate: Send + Sync {
    fn is_system(&self, actor_id: Option<&str>, actor_label: Option<&str>) -> bool;

    fn is_system_record(&self, record: &AuditRecord) -> bool {
        self.is_system(record.actor_id.as_deref(), record.actor_label.as_deref())
    }
}

impl<F> SystemActorPredicate for F
where
    F: Fn(Option<&str>, Option<&str>) -> bool + Send + Sync,
{
    fn is_system(&self, actor_id: Option<&str>, actor_label: Option<&str>) -> bool {
        self(actor_id, actor_label)
    }
}

/// Default rule keyed on the producer's automation sentinel.
///
/// A human whose label is a bare username (no `@`) and whose id is not
/// numeric is classified as system. Swap in another predicate to change that.
#[derive(Debug, Clone)]
pub struct SentinelHeuristic {
    sentinel: String,
}

impl SentinelHeuristic {
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
        }
    }

    pub fn from_config(config: &ActorConfig) -> Self {
        Self::new(config.automation_sentinel.clone())
    }
}

impl Default for SentinelHeuristic {
    fn default() -> Self {
        Self::from_config(&ActorConfig::default())
    }
}

impl SystemActorPredicate for SentinelHeuristic {
    fn is_system(&self, actor_id: Option<&str>, actor_label: Option<&str>) -> bool {
        let label = match actor_label {
            Some(label) if !label.is_empty() => label,
            _ => return true,
        };
        if label.contains('@') {
            return false;
        }
        let id = actor_id.unwrap_or_default();
        if id == self.sentinel {
            return true;
        }
        let numeric = !id.is_empty() && id.chars().all(|c| c.is_ascii_digit());
        !numeric
    }
}
