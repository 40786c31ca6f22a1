//! Caller-facing filter criteria and their loose parsing from admin-grid
//! parameter maps.

use serde_json::{Map, Value};

use chronicle_core::models::ChangeKind;

/// How a subject id filter matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectMatch {
    Exact(String),
    /// `abc*`
    Prefix(String),
    /// `*abc*`
    Contains(String),
}

impl SubjectMatch {
    /// Parse a subject filter value. Blank input and bare wildcards yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let matcher = match (raw.strip_prefix('*'), raw.strip_suffix('*')) {
            (Some(_), Some(_)) if raw.len() >= 2 => Self::Contains(raw[1..raw.len() - 1].to_string()),
            (None, Some(prefix)) => Self::Prefix(prefix.to_string()),
            _ => Self::Exact(raw.to_string()),
        };
        match &matcher {
            Self::Exact(s) | Self::Prefix(s) | Self::Contains(s) if s.is_empty() || s == "*" => None,
            _ => Some(matcher),
        }
    }

    pub fn matches(&self, subject_id: &str) -> bool {
        match self {
            Self::Exact(s) => subject_id == s,
            Self::Prefix(s) => subject_id.starts_with(s.as_str()),
            Self::Contains(s) => subject_id.contains(s.as_str()),
        }
    }
}

/// Raw date bounds, parsed when the query is compiled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Filters accepted by [`super::FilterCompiler::query`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditFilters {
    pub subject: Option<SubjectMatch>,
    pub change_kinds: Vec<ChangeKind>,
    pub occurred: Option<DateRange>,
    pub correlation_hash: Option<String>,
    pub actor_label: Option<String>,
    pub hide_system: bool,
    pub request_id: Option<String>,
}

impl AuditFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(mut self, raw: &str) -> Self {
        self.subject = SubjectMatch::parse(raw);
        self
    }

    pub fn change_kind(mut self, kind: ChangeKind) -> Self {
        self.change_kinds.push(kind);
        self
    }

    pub fn occurred_between(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.occurred = Some(DateRange {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
        });
        self
    }

    pub fn correlation_hash(mut self, hash: &str) -> Self {
        self.correlation_hash = Some(hash.to_string());
        self
    }

    pub fn actor_label(mut self, label: &str) -> Self {
        self.actor_label = Some(label.to_string());
        self
    }

    pub fn hide_system(mut self, hide: bool) -> Self {
        self.hide_system = hide;
        self
    }

    pub fn request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }

    /// Build filters from a loosely-typed parameter map. Unknown keys and
    /// unusable shapes are ignored.
    pub fn from_map(params: &Map<String, Value>) -> Self {
        let mut filters = Self::default();
        for (key, value) in params {
            match key.as_str() {
                "object_id" | "objectId" | "subjectId" | "subject_id" => {
                    filters.subject = scalar_text(value).and_then(|s| SubjectMatch::parse(&s));
                }
                "type" | "changeKind" | "change_kind" => {
                    filters.change_kinds = kinds(value);
                }
                "created_at" | "occurredAt" | "occurred_at" => {
                    filters.occurred = date_range(value);
                }
                "transaction_hash" | "correlationHash" | "correlation_hash" => {
                    filters.correlation_hash = scalar_text(value);
                }
                "blame_user" | "actorLabel" | "actor_label" => {
                    filters.actor_label = scalar_text(value);
                }
                "hideSystem" | "hide_system" => {
                    filters.hide_system = truthy(value);
                }
                "request_id" | "requestId" => {
                    filters.request_id = scalar_text(value);
                }
                _ => {}
            }
        }
        filters
    }
}

/// Non-blank string or number rendered as text.
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn kinds(value: &Value) -> Vec<ChangeKind> {
    let parse = |v: &Value| v.as_str().and_then(|s| s.parse::<ChangeKind>().ok());
    match value {
        Value::Array(items) => items.iter().filter_map(parse).collect(),
        other => parse(other).into_iter().collect(),
    }
}

fn date_range(value: &Value) -> Option<DateRange> {
    let obj = value.as_object()?;
    let bound = |key: &str| obj.get(key).and_then(scalar_text);
    let range = DateRange {
        from: bound("from"),
        to: bound("to"),
    };
    (range.from.is_some() || range.to.is_some()).then_some(range)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn subject_wildcards() {
        assert_eq!(SubjectMatch::parse("42"), Some(SubjectMatch::Exact("42".into())));
        assert_eq!(SubjectMatch::parse("4*"), Some(SubjectMatch::Prefix("4".into())));
        assert_eq!(SubjectMatch::parse("*4*"), Some(SubjectMatch::Contains("4".into())));
        assert_eq!(SubjectMatch::parse("  "), None);
        assert_eq!(SubjectMatch::parse("*"), None);
        assert_eq!(SubjectMatch::parse("**"), None);
    }

    #[test]
    fn subject_matching() {
        assert!(SubjectMatch::Prefix("4".into()).matches("42"));
        assert!(!SubjectMatch::Prefix("4".into()).matches("14"));
        assert!(SubjectMatch::Contains("4".into()).matches("140"));
        assert!(!SubjectMatch::Exact("4".into()).matches("42"));
    }

    #[test]
    fn admin_grid_parameters() {
        let filters = AuditFilters::from_map(&map(json!({
            "object_id": 7,
            "type": ["update", "bogus", "INSERT"],
            "created_at": {"from": "2024-01-01", "to": ""},
            "transaction_hash": "abc",
            "blame_user": "alice",
            "hideSystem": "1",
            "request_id": "req-1",
            "page_color": "blue"
        })));
        assert_eq!(filters.subject, Some(SubjectMatch::Exact("7".into())));
        assert_eq!(filters.change_kinds, vec![ChangeKind::Updated, ChangeKind::Created]);
        assert_eq!(
            filters.occurred,
            Some(DateRange { from: Some("2024-01-01".into()), to: None })
        );
        assert_eq!(filters.correlation_hash.as_deref(), Some("abc"));
        assert_eq!(filters.actor_label.as_deref(), Some("alice"));
        assert!(filters.hide_system);
        assert_eq!(filters.request_id.as_deref(), Some("req-1"));
    }

    #[test]
    fn unusable_shapes_apply_no_filter() {
        let filters = AuditFilters::from_map(&map(json!({
            "type": {"nested": true},
            "created_at": "2024-01-01",
            "transaction_hash": "",
            "hide_system": "no",
            "subjectId": null
        })));
        assert_eq!(filters, AuditFilters::default());
    }

    #[test]
    fn single_change_kind_string() {
        let filters = AuditFilters::from_map(&map(json!({"changeKind": "remove"})));
        assert_eq!(filters.change_kinds, vec![ChangeKind::Removed]);
    }
}
