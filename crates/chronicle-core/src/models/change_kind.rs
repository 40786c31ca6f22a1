use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ChronicleError;

/// What kind of change an audit record describes.
///
/// Serialized with the producer's wire names (`insert`, `update`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    #[serde(rename = "insert")]
    Created,
    #[serde(rename = "update")]
    Updated,
    #[serde(rename = "remove")]
    Removed,
    #[serde(rename = "associate")]
    Associated,
    #[serde(rename = "dissociate")]
    Dissociated,
    #[serde(rename = "event")]
    DomainEvent,
}

impl ChangeKind {
    pub const ALL: [ChangeKind; 6] = [
        ChangeKind::Created,
        ChangeKind::Updated,
        ChangeKind::Removed,
        ChangeKind::Associated,
        ChangeKind::Dissociated,
        ChangeKind::DomainEvent,
    ];

    /// Wire name as stored in the log.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Created => "insert",
            ChangeKind::Updated => "update",
            ChangeKind::Removed => "remove",
            ChangeKind::Associated => "associate",
            ChangeKind::Dissociated => "dissociate",
            ChangeKind::DomainEvent => "event",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeKind {
    type Err = ChronicleError;

    /// Accepts wire names and the variant names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "insert" | "created" => Ok(ChangeKind::Created),
            "update" | "updated" => Ok(ChangeKind::Updated),
            "remove" | "removed" | "delete" => Ok(ChangeKind::Removed),
            "associate" | "associated" => Ok(ChangeKind::Associated),
            "dissociate" | "dissociated" => Ok(ChangeKind::Dissociated),
            "event" | "domainevent" | "domain_event" => Ok(ChangeKind::DomainEvent),
            other => Err(ChronicleError::data_format(other, "unknown change kind")),
        }
    }
}
