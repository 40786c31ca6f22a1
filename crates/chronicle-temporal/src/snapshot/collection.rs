//! Undoing a recorded collection change.
//!
//! Members the change added are removed again, matched by identity. Members
//! it removed cannot be put back: the log only keeps their id and label, not
//! the member itself, so a reconstructed collection may be missing them.

use std::collections::HashSet;

use serde_json::Value;

use chronicle_core::models::{member_identity, FieldChange, FieldValue};

/// Current collection value as a list of members.
fn members(current: &FieldValue) -> Vec<Value> {
    match current {
        FieldValue::Collection(items) | FieldValue::List(items) => items.clone(),
        FieldValue::Raw(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// Undo one collection change against the current value.
pub fn reverse_collection(current: &FieldValue, change: &FieldChange<'_>) -> FieldValue {
    let mut items = members(current);
    if let FieldChange::Collection { added, .. } = change {
        let added: HashSet<String> = added.iter().filter_map(member_identity).collect();
        if !added.is_empty() {
            items.retain(|member| member_identity(member).map_or(true, |id| !added.contains(&id)));
        }
    }
    FieldValue::Collection(items)
}
