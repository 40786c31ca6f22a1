//! The structured payload of an audit record.
//!
//! The raw JSON map is classified exactly once, when the change set is
//! built, and the resulting [`ChangeCategory`] travels with it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::constants::{CONTEXT_KEY, EVENT_KEY, RESERVED_PREFIX};
use crate::diff::{classify, ChangeCategory};

use super::AuditContext;

static NULL: Value = Value::Null;

/// One field's entry inside a change set.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange<'a> {
    /// `{old, new}`.
    Scalar { old: &'a Value, new: &'a Value },
    /// Legacy positional `[old, new]`.
    Positional { old: &'a Value, new: &'a Value },
    /// `{removed: [...], added: [...]}`.
    Collection {
        removed: &'a [Value],
        added: &'a [Value],
    },
    /// Anything else.
    Other(&'a Value),
}

impl<'a> FieldChange<'a> {
    fn decode(value: &'a Value) -> Self {
        match value {
            Value::Object(map) if map.contains_key("old") || map.contains_key("new") => {
                FieldChange::Scalar {
                    old: map.get("old").unwrap_or(&NULL),
                    new: map.get("new").unwrap_or(&NULL),
                }
            }
            Value::Object(map) if map.contains_key("removed") || map.contains_key("added") => {
                FieldChange::Collection {
                    removed: as_slice(map.get("removed")),
                    added: as_slice(map.get("added")),
                }
            }
            Value::Array(items) if items.len() == 2 => FieldChange::Positional {
                old: &items[0],
                new: &items[1],
            },
            other => FieldChange::Other(other),
        }
    }

    /// The prior value for scalar-shaped entries.
    pub fn old_value(&self) -> Option<&'a Value> {
        match self {
            FieldChange::Scalar { old, .. } | FieldChange::Positional { old, .. } => Some(*old),
            _ => None,
        }
    }
}

fn as_slice(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

/// `{class, id, label}` reference used by entity summaries and links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub label: Option<String>,
}

/// Payload of Created/Removed records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub class: String,
    pub label: String,
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default, rename = "pkName")]
    pub pk_name: Option<String>,
}

/// Payload of Associated/Dissociated records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationLink {
    pub source: EntityRef,
    pub target: EntityRef,
    #[serde(default, rename = "isOwningSide")]
    pub is_owning_side: bool,
}

/// A classified change set.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    raw: Map<String, Value>,
    category: ChangeCategory,
}

impl ChangeSet {
    /// Build a change set from its raw map, classifying it once.
    pub fn new(raw: Map<String, Value>) -> Self {
        let category = classify(&strip_context(&raw));
        Self { raw, category }
    }

    /// Build from any JSON value; non-object payloads become an empty set.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::new(map),
            _ => Self::new(Map::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(Map::new())
    }

    pub fn category(&self) -> ChangeCategory {
        self.category
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// The producer-attached context, if present and well-formed.
    pub fn context(&self) -> Option<AuditContext> {
        self.raw
            .get(CONTEXT_KEY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Domain event name for `event` records.
    pub fn event_name(&self) -> Option<&str> {
        self.raw.get(EVENT_KEY).and_then(Value::as_str)
    }

    /// Field entries, skipping every reserved `@` key.
    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldChange<'_>)> {
        self.raw
            .iter()
            .filter(|(key, _)| !key.starts_with(RESERVED_PREFIX))
            .map(|(key, value)| (key.as_str(), FieldChange::decode(value)))
    }

    pub fn field(&self, name: &str) -> Option<FieldChange<'_>> {
        if name.starts_with(RESERVED_PREFIX) {
            return None;
        }
        self.raw.get(name).map(FieldChange::decode)
    }

    pub fn entity_summary(&self) -> Option<EntitySummary> {
        if self.category != ChangeCategory::EntitySummary {
            return None;
        }
        serde_json::from_value(Value::Object(strip_context(&self.raw))).ok()
    }

    pub fn association_link(&self) -> Option<AssociationLink> {
        if self.category != ChangeCategory::AssociationLink {
            return None;
        }
        serde_json::from_value(Value::Object(strip_context(&self.raw))).ok()
    }
}

impl Default for ChangeSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl Serialize for ChangeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChangeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// Copy of `raw` without the `"@context"` entry.
pub fn strip_context(raw: &Map<String, Value>) -> Map<String, Value> {
    raw.iter()
        .filter(|(key, _)| key.as_str() != CONTEXT_KEY)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
