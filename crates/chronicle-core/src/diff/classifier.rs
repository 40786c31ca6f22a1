use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structural category of a change set (with `"@context"` stripped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCategory {
    FieldUpdate,
    CollectionChange,
    EntitySummary,
    AssociationLink,
    Unknown,
}

/// Classify a change set by shape alone. First match wins:
///
/// 1. empty → `Unknown`
/// 2. `class` and `label` keys → `EntitySummary`
/// 3. `source`, `target` and an `isOwningSide` key (any value) → `AssociationLink`
/// 4. any value is a map with `old`/`new` → `FieldUpdate`, else any value is
///    a map with `removed`/`added` → `CollectionChange`
/// 5. otherwise `Unknown`
///
/// The flat checks run first so entity summaries and links are never
/// mistaken for field maps.
pub fn classify(change_set: &Map<String, Value>) -> ChangeCategory {
    if change_set.is_empty() {
        return ChangeCategory::Unknown;
    }
    if change_set.contains_key("class") && change_set.contains_key("label") {
        return ChangeCategory::EntitySummary;
    }
    if change_set.contains_key("source")
        && change_set.contains_key("target")
        && change_set.contains_key("isOwningSide")
    {
        return ChangeCategory::AssociationLink;
    }
    if any_value_has(change_set, &["old", "new"]) {
        return ChangeCategory::FieldUpdate;
    }
    if any_value_has(change_set, &["removed", "added"]) {
        return ChangeCategory::CollectionChange;
    }
    ChangeCategory::Unknown
}

fn any_value_has(change_set: &Map<String, Value>, keys: &[&str]) -> bool {
    change_set.values().any(|value| match value {
        Value::Object(inner) => keys.iter().any(|k| inner.contains_key(*k)),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn empty_is_unknown() {
        assert_eq!(classify(&Map::new()), ChangeCategory::Unknown);
    }

    #[test]
    fn entity_summary_wins_over_field_shapes() {
        let cs = map(json!({
            "class": "App\\Order", "label": "Order #7", "id": 7, "table": "orders",
            "extra": {"old": 1, "new": 2}
        }));
        assert_eq!(classify(&cs), ChangeCategory::EntitySummary);
    }

    #[test]
    fn association_link_accepts_false_owning_side() {
        let cs = map(json!({
            "source": {"class": "Order", "id": 1, "label": "o"},
            "target": {"class": "Tag", "id": 2, "label": "t"},
            "isOwningSide": false
        }));
        assert_eq!(classify(&cs), ChangeCategory::AssociationLink);
    }

    #[test]
    fn association_link_needs_owning_side_key() {
        let cs = map(json!({"source": {"id": 1}, "target": {"id": 2}}));
        assert_eq!(classify(&cs), ChangeCategory::Unknown);
    }

    #[test]
    fn field_update_detected_before_collection_change() {
        let cs = map(json!({
            "tags": {"removed": [], "added": [{"id": 1}]},
            "status": {"old": "draft", "new": "paid"}
        }));
        assert_eq!(classify(&cs), ChangeCategory::FieldUpdate);
    }

    #[test]
    fn collection_change_detected() {
        let cs = map(json!({"tags": {"removed": [{"id": 3, "label": "x"}], "added": []}}));
        assert_eq!(classify(&cs), ChangeCategory::CollectionChange);
    }

    #[test]
    fn event_payload_is_unknown() {
        let cs = map(json!({"@event": "order.created", "total": 100}));
        assert_eq!(classify(&cs), ChangeCategory::Unknown);
    }
}
