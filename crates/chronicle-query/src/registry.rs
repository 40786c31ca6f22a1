//! Registry of per-entity-type audit log handles, the fan-out set for
//! scatter-gather.

use std::collections::BTreeMap;
use std::sync::Arc;

use chronicle_core::constants::IDENTIFIER_PREFIX;
use chronicle_core::errors::ChronicleResult;
use chronicle_core::{AuditLogStore, ChronicleError};

#[derive(Default, Clone)]
pub struct EntityLogRegistry {
    logs: BTreeMap<String, Arc<dyn AuditLogStore>>,
}

impl EntityLogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_logs(logs: impl IntoIterator<Item = Arc<dyn AuditLogStore>>) -> Self {
        let mut registry = Self::new();
        for log in logs {
            registry.register(log);
        }
        registry
    }

    /// Register a log under its entity type, replacing any previous handle.
    pub fn register(&mut self, log: Arc<dyn AuditLogStore>) {
        self.logs.insert(log.entity_type().to_string(), log);
    }

    pub fn get(&self, entity_type: &str) -> ChronicleResult<Arc<dyn AuditLogStore>> {
        self.logs
            .get(entity_type)
            .cloned()
            .ok_or_else(|| ChronicleError::store_unavailable(entity_type, "entity type not registered"))
    }

    /// Entity types in sorted order.
    pub fn entity_types(&self) -> Vec<String> {
        self.logs.keys().cloned().collect()
    }

    pub fn logs(&self) -> impl Iterator<Item = (&str, &Arc<dyn AuditLogStore>)> {
        self.logs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Resolve a data-source identifier, with or without a trailing
    /// `/item-id`. Returns the log and the item id, if any.
    pub fn resolve<'a>(&self, identifier: &'a str) -> Option<(Arc<dyn AuditLogStore>, Option<&'a str>)> {
        let (source, item) = match identifier.split_once('/') {
            Some((source, item)) => (source, Some(item)),
            None => (identifier, None),
        };
        self.logs
            .iter()
            .find(|(entity_type, _)| data_source_identifier(entity_type) == source)
            .map(|(_, log)| (Arc::clone(log), item))
    }
}

/// `audit-` followed by the entity type with separators turned into `-`,
/// e.g. `App\Entity\Order` → `audit-App-Entity-Order`.
pub fn data_source_identifier(entity_type: &str) -> String {
    let mut slug = String::with_capacity(entity_type.len());
    for c in entity_type.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    format!("{IDENTIFIER_PREFIX}{}", slug.trim_matches('-'))
}

/// Last segment of a `\`, `::` or `.` separated type name.
pub fn short_name(entity_type: &str) -> &str {
    entity_type
        .rsplit(|c: char| c == '\\' || c == ':' || c == '.')
        .find(|segment| !segment.is_empty())
        .unwrap_or(entity_type)
}
