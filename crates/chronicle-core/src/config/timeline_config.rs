use serde::{Deserialize, Serialize};

use super::defaults;

/// Correlation and timeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Half-width of the actor timeline window, in minutes.
    pub default_window_minutes: i64,
    /// Fan per-type queries out across the rayon pool.
    pub parallel_fan_out: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            default_window_minutes: defaults::DEFAULT_WINDOW_MINUTES,
            parallel_fan_out: defaults::DEFAULT_PARALLEL_FAN_OUT,
        }
    }
}
