//! Field values and declared field types used by point-in-time reconstruction.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// One case of a declared enum type: its name and backing value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumCase {
    pub name: String,
    pub backing: Value,
}

impl EnumCase {
    pub fn new(name: impl Into<String>, backing: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            backing: backing.into(),
        }
    }
}

/// Declared type of an entity field, supplied by the caller's accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Int,
    Float,
    Bool,
    Text,
    /// Backed enum; values resolve against the case backing values.
    Enum(Vec<EnumCase>),
    Timestamp,
    List,
    /// Collection of related entities identified by their `id`.
    Collection,
    /// Any other declared type; values pass through unchanged.
    Other(String),
    /// No type information.
    Untyped,
}

impl TypeDescriptor {
    pub fn is_collection(&self) -> bool {
        matches!(self, TypeDescriptor::Collection)
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Enum(EnumCase),
    List(Vec<Value>),
    /// Members are JSON objects carrying at least an `id`.
    Collection(Vec<Value>),
    Raw(Value),
}

impl FieldValue {
    /// Untyped conversion from a JSON value.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(0.0)),
            },
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(items) => FieldValue::List(items.clone()),
            Value::Object(_) => FieldValue::Raw(value.clone()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Float(f) => Value::from(*f),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Timestamp(t) => Value::String(t.to_rfc3339()),
            FieldValue::Enum(case) => case.backing.clone(),
            FieldValue::List(items) | FieldValue::Collection(items) => Value::Array(items.clone()),
            FieldValue::Raw(v) => v.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// Identity of a collection member: its `id` (objects) or the value itself
/// (bare strings and numbers), rendered as a string so `7` and `"7"` match.
pub fn member_identity(member: &Value) -> Option<String> {
    match member {
        Value::Object(map) => map.get("id").and_then(scalar_identity),
        other => scalar_identity(other),
    }
}

fn scalar_identity(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn member_identity_matches_across_number_and_string() {
        assert_eq!(member_identity(&json!({"id": 7, "label": "x"})), Some("7".into()));
        assert_eq!(member_identity(&json!({"id": "7"})), Some("7".into()));
        assert_eq!(member_identity(&json!("7")), Some("7".into()));
        assert_eq!(member_identity(&json!({"label": "no id"})), None);
    }

    #[test]
    fn from_json_keeps_integers_integral() {
        assert_eq!(FieldValue::from_json(&json!(3)), FieldValue::Int(3));
        assert_eq!(FieldValue::from_json(&json!(3.5)), FieldValue::Float(3.5));
        assert_eq!(FieldValue::from_json(&json!({"a": 1})), FieldValue::Raw(json!({"a": 1})));
    }
}
