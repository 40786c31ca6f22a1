use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::{
    PREVIEW_KEEP_STRING_LEN, PREVIEW_MAX_ITEMS, PREVIEW_MAX_STRING_LEN, RESERVED_PREFIX,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewKind {
    Update,
    Association,
}

/// One changed field in a preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewEntry {
    pub field: String,
    pub kind: PreviewKind,
    pub old: Option<Value>,
    pub new: Option<Value>,
    pub removed_count: usize,
    pub added_count: usize,
}

/// Inline summary of a change set for table display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangePreview {
    pub total_changes: usize,
    pub changes: Vec<PreviewEntry>,
}

/// Build a preview. Reserved keys and non-map values are skipped; fields
/// that are neither `{old,new}` nor `{removed,added}` are not listed.
pub fn create_preview(change_set: &Map<String, Value>) -> ChangePreview {
    let mut preview = ChangePreview::default();

    for (field, value) in change_set {
        if field.starts_with(RESERVED_PREFIX) {
            continue;
        }
        let Value::Object(inner) = value else {
            continue;
        };

        let entry = if inner.contains_key("old") && inner.contains_key("new") {
            PreviewEntry {
                field: field.clone(),
                kind: PreviewKind::Update,
                old: inner.get("old").map(truncate_value),
                new: inner.get("new").map(truncate_value),
                removed_count: 0,
                added_count: 0,
            }
        } else if inner.contains_key("removed") && inner.contains_key("added") {
            PreviewEntry {
                field: field.clone(),
                kind: PreviewKind::Association,
                old: None,
                new: None,
                removed_count: array_len(inner.get("removed")),
                added_count: array_len(inner.get("added")),
            }
        } else {
            continue;
        };

        preview.changes.push(entry);
        preview.total_changes += 1;
    }

    preview
}

fn array_len(value: Option<&Value>) -> usize {
    value.and_then(Value::as_array).map_or(0, Vec::len)
}

/// Shorten a value for preview display: strings over 50 characters keep 47
/// plus `...`; sequences over 3 items keep 3 plus a `(N more)` marker.
pub fn truncate_value(value: &Value) -> Value {
    match value {
        Value::String(s) if s.chars().count() > PREVIEW_MAX_STRING_LEN => {
            let mut out: String = s.chars().take(PREVIEW_KEEP_STRING_LEN).collect();
            out.push_str("...");
            Value::String(out)
        }
        Value::Array(items) if items.len() > PREVIEW_MAX_ITEMS => {
            let mut out: Vec<Value> = items.iter().take(PREVIEW_MAX_ITEMS).cloned().collect();
            out.push(Value::String(more_marker(items.len())));
            Value::Array(out)
        }
        Value::Object(map) if map.len() > PREVIEW_MAX_ITEMS => {
            let mut out: Map<String, Value> = map
                .iter()
                .take(PREVIEW_MAX_ITEMS)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            out.insert("...".to_string(), Value::String(more_marker(map.len())));
            Value::Object(out)
        }
        other => other.clone(),
    }
}

fn more_marker(len: usize) -> String {
    format!("({} more)", len - PREVIEW_MAX_ITEMS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn long_strings_are_truncated_to_47_plus_ellipsis() {
        let long = "a".repeat(60);
        let out = truncate_value(&json!(long));
        let s = out.as_str().unwrap();
        assert_eq!(s.len(), 50);
        assert!(s.ends_with("..."));
        assert_eq!(truncate_value(&json!("a".repeat(50))), json!("a".repeat(50)));
    }

    #[test]
    fn long_sequences_keep_three_items() {
        let out = truncate_value(&json!([1, 2, 3, 4, 5]));
        assert_eq!(out, json!([1, 2, 3, "(2 more)"]));
    }

    #[test]
    fn preview_counts_updates_and_associations() {
        let cs = json!({
            "@context": {"note": "x"},
            "status": {"old": "draft", "new": "paid"},
            "tags": {"removed": [{"id": 1}], "added": [{"id": 2}, {"id": 3}]},
            "weird": {"foo": 1},
            "flat": 5
        });
        let preview = create_preview(cs.as_object().unwrap());
        assert_eq!(preview.total_changes, 2);
        let tags = preview.changes.iter().find(|c| c.field == "tags").unwrap();
        assert_eq!(tags.kind, PreviewKind::Association);
        assert_eq!((tags.removed_count, tags.added_count), (1, 2));
    }
}
