use serde::{Deserialize, Serialize};

/// Typed view of the producer-attached `"@context"` map.
///
/// Unknown keys are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(
        default,
        rename = "requestId",
        alias = "request_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AuditContext {
    pub fn is_empty(&self) -> bool {
        self.note.is_none() && self.reason.is_none() && self.request_id.is_none() && self.extra.is_empty()
    }
}
