use super::StorageError;

/// Top-level error type for the Chronicle audit reader.
#[derive(Debug, thiserror::Error)]
pub enum ChronicleError {
    /// Malformed caller input, e.g. an unparseable date.
    #[error("invalid input '{input}': {reason}")]
    DataFormat { input: String, reason: String },

    /// A reconstruction batch mixed entities of different types.
    #[error("all entities must share one entity type: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A per-entity-type log is missing, unreachable, or corrupt.
    #[error("audit log for '{entity_type}' unavailable: {reason}")]
    StoreUnavailable { entity_type: String, reason: String },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl ChronicleError {
    pub fn data_format(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataFormat {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn store_unavailable(entity_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            entity_type: entity_type.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is a caller-input validation failure rather than
    /// a backend failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::DataFormat { .. } | Self::TypeMismatch { .. })
    }
}

pub type ChronicleResult<T> = Result<T, ChronicleError>;
