//! Coercion of recorded JSON values back to a field's declared type.

use serde_json::Value;

use chronicle_core::models::{FieldValue, TypeDescriptor};
use chronicle_query::filter::dates::{parse_bound, Bound};

/// Coerce a recorded value to `ty`. Values that cannot be converted pass
/// through untyped rather than failing.
pub fn coerce(value: &Value, ty: &TypeDescriptor) -> FieldValue {
    if value.is_null() {
        return FieldValue::Null;
    }
    match ty {
        TypeDescriptor::Int => to_int(value).map_or_else(|| FieldValue::from_json(value), FieldValue::Int),
        TypeDescriptor::Float => to_float(value).map_or_else(|| FieldValue::from_json(value), FieldValue::Float),
        TypeDescriptor::Bool => FieldValue::Bool(truthy(value)),
        TypeDescriptor::Text => match value {
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Number(n) => FieldValue::Text(n.to_string()),
            Value::Bool(b) => FieldValue::Text(b.to_string()),
            other => FieldValue::from_json(other),
        },
        TypeDescriptor::Enum(cases) => cases
            .iter()
            .find(|case| same_scalar(&case.backing, value))
            .map_or_else(|| FieldValue::from_json(value), |case| FieldValue::Enum(case.clone())),
        TypeDescriptor::Timestamp => match value {
            Value::String(s) => parse_bound(s, Bound::Start)
                .map_or_else(|_| FieldValue::from_json(value), FieldValue::Timestamp),
            other => FieldValue::from_json(other),
        },
        TypeDescriptor::List => match value {
            Value::Array(items) => FieldValue::List(items.clone()),
            scalar => FieldValue::List(vec![scalar.clone()]),
        },
        TypeDescriptor::Collection => match value {
            Value::Array(items) => FieldValue::Collection(items.clone()),
            other => FieldValue::from_json(other),
        },
        TypeDescriptor::Other(_) | TypeDescriptor::Untyped => FieldValue::from_json(value),
    }
}

fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// `""`, `"0"` and `"false"` are false; any other string is true.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Null => false,
    }
}

/// Backing values match across JSON scalar kinds, so `1` matches `"1"`.
fn same_scalar(backing: &Value, value: &Value) -> bool {
    if backing == value {
        return true;
    }
    match (backing, value) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            s.trim() == n.to_string()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::models::EnumCase;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn numeric_strings_become_numbers() {
        assert_eq!(coerce(&json!("42"), &TypeDescriptor::Int), FieldValue::Int(42));
        assert_eq!(coerce(&json!("4.5"), &TypeDescriptor::Int), FieldValue::Int(4));
        assert_eq!(coerce(&json!("4.5"), &TypeDescriptor::Float), FieldValue::Float(4.5));
        assert_eq!(coerce(&json!(3), &TypeDescriptor::Float), FieldValue::Float(3.0));
        assert_eq!(coerce(&json!("n/a"), &TypeDescriptor::Int), FieldValue::Text("n/a".into()));
    }

    #[test]
    fn bools_from_flags_and_strings() {
        assert_eq!(coerce(&json!("0"), &TypeDescriptor::Bool), FieldValue::Bool(false));
        assert_eq!(coerce(&json!("1"), &TypeDescriptor::Bool), FieldValue::Bool(true));
        assert_eq!(coerce(&json!("yes"), &TypeDescriptor::Bool), FieldValue::Bool(true));
        assert_eq!(coerce(&json!(0), &TypeDescriptor::Bool), FieldValue::Bool(false));
        assert_eq!(coerce(&json!(""), &TypeDescriptor::Bool), FieldValue::Bool(false));
    }

    #[test]
    fn enums_resolve_against_backing_values() {
        let ty = TypeDescriptor::Enum(vec![EnumCase::new("Low", 1), EnumCase::new("High", 3)]);
        assert_eq!(coerce(&json!(3), &ty), FieldValue::Enum(EnumCase::new("High", 3)));
        assert_eq!(coerce(&json!("1"), &ty), FieldValue::Enum(EnumCase::new("Low", 1)));
        assert_eq!(coerce(&json!(7), &ty), FieldValue::Int(7));
    }

    #[test]
    fn timestamps_parse_or_pass_through() {
        assert_eq!(
            coerce(&json!("2024-01-10 12:00:00"), &TypeDescriptor::Timestamp),
            FieldValue::Timestamp(Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap())
        );
        assert_eq!(
            coerce(&json!("not a date"), &TypeDescriptor::Timestamp),
            FieldValue::Text("not a date".into())
        );
    }

    #[test]
    fn lists_wrap_scalars() {
        assert_eq!(coerce(&json!("a"), &TypeDescriptor::List), FieldValue::List(vec![json!("a")]));
        assert_eq!(coerce(&json!(["a"]), &TypeDescriptor::List), FieldValue::List(vec![json!("a")]));
    }

    #[test]
    fn null_stays_null_and_unknown_types_pass_through() {
        assert_eq!(coerce(&Value::Null, &TypeDescriptor::Int), FieldValue::Null);
        assert_eq!(
            coerce(&json!({"k": 1}), &TypeDescriptor::Other("Money".into())),
            FieldValue::Raw(json!({"k": 1}))
        );
        assert_eq!(coerce(&json!(5), &TypeDescriptor::Untyped), FieldValue::Int(5));
        assert_eq!(coerce(&json!(5), &TypeDescriptor::Text), FieldValue::Text("5".into()));
    }
}
