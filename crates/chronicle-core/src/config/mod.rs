//! Configuration for every Chronicle subsystem, loadable from TOML.

mod actor_config;
pub mod defaults;
mod query_config;
mod storage_config;
mod timeline_config;

use serde::{Deserialize, Serialize};

pub use actor_config::ActorConfig;
pub use query_config::QueryConfig;
pub use storage_config::StorageConfig;
pub use timeline_config::TimelineConfig;

use crate::errors::{ChronicleError, ChronicleResult};

/// Top-level configuration. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChronicleConfig {
    pub storage: StorageConfig,
    pub query: QueryConfig,
    pub timeline: TimelineConfig,
    pub actor: ActorConfig,
}

impl ChronicleConfig {
    /// Parse a TOML document. Missing sections and keys keep their defaults.
    pub fn from_toml(source: &str) -> ChronicleResult<Self> {
        toml::from_str(source).map_err(|e| ChronicleError::ConfigError(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: &std::path::Path) -> ChronicleResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            ChronicleError::ConfigError(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&source)
    }
}
