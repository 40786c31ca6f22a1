use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::RESERVED_PREFIX;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateDiff {
    pub old: Value,
    pub new: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssociationDiff {
    pub removed: Value,
    pub added: Value,
}

/// Full change-set breakdown grouped into buckets. A bucket with no entries
/// is `None` and is omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailedBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updates: Option<BTreeMap<String, UpdateDiff>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associations: Option<BTreeMap<String, AssociationDiff>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other: Option<BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
}

pub fn detailed_breakdown(change_set: &Map<String, Value>) -> DetailedBreakdown {
    let mut updates = BTreeMap::new();
    let mut associations = BTreeMap::new();
    let mut other = BTreeMap::new();
    let mut metadata = BTreeMap::new();

    for (key, value) in change_set {
        if key.starts_with(RESERVED_PREFIX) {
            metadata.insert(key.clone(), value.clone());
            continue;
        }
        match value {
            Value::Object(inner) if inner.contains_key("old") && inner.contains_key("new") => {
                updates.insert(
                    key.clone(),
                    UpdateDiff {
                        old: inner["old"].clone(),
                        new: inner["new"].clone(),
                    },
                );
            }
            Value::Object(inner) if inner.contains_key("removed") && inner.contains_key("added") => {
                associations.insert(
                    key.clone(),
                    AssociationDiff {
                        removed: inner["removed"].clone(),
                        added: inner["added"].clone(),
                    },
                );
            }
            _ => {
                other.insert(key.clone(), value.clone());
            }
        }
    }

    DetailedBreakdown {
        updates: non_empty(updates),
        associations: non_empty(associations),
        other: non_empty(other),
        metadata: non_empty(metadata),
    }
}

fn non_empty<V>(bucket: BTreeMap<String, V>) -> Option<BTreeMap<String, V>> {
    (!bucket.is_empty()).then_some(bucket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_buckets_are_dropped() {
        let cs = json!({"status": {"old": 1, "new": 2}});
        let out = detailed_breakdown(cs.as_object().unwrap());
        assert!(out.updates.is_some());
        assert!(out.associations.is_none());
        assert!(out.other.is_none());
        assert!(out.metadata.is_none());
        assert_eq!(serde_json::to_value(&out).unwrap(), json!({"updates": {"status": {"old": 1, "new": 2}}}));
    }

    #[test]
    fn reserved_keys_go_to_metadata() {
        let cs = json!({"@context": {"reason": "fix"}, "@event": "x", "total": 3});
        let out = detailed_breakdown(cs.as_object().unwrap());
        let metadata = out.metadata.unwrap();
        assert!(metadata.contains_key("@context"));
        assert!(metadata.contains_key("@event"));
        assert_eq!(out.other.unwrap()["total"], json!(3));
    }
}
