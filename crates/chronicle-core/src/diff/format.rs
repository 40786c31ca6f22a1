use serde_json::Value;

use crate::constants::FORMAT_VALUE_MAX_LEN;

/// Compact JSON rendering of a value, truncated to `max_len` characters
/// (the last three replaced by `...`).
pub fn format_value(value: &Value, max_len: usize) -> String {
    let json = value.to_string();
    if json.chars().count() <= max_len {
        return json;
    }
    let keep = max_len.saturating_sub(3);
    let mut out: String = json.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// `format_value` at the default display width.
pub fn format_value_default(value: &Value) -> String {
    format_value(value, FORMAT_VALUE_MAX_LEN)
}
