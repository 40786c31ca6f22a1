use serde::{Deserialize, Serialize};

use super::defaults;

/// Actor classification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Actor id the producer writes for non-interactive changes.
    pub automation_sentinel: String,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            automation_sentinel: defaults::DEFAULT_AUTOMATION_SENTINEL.to_string(),
        }
    }
}
