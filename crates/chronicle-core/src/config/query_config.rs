use serde::{Deserialize, Serialize};

use super::defaults;

/// Filter compilation and pagination configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page size used when the caller passes 0.
    pub default_page_size: usize,
    /// Upper bound on any requested page size.
    pub max_page_size: usize,
    /// Treat the actor filter as a case-insensitive substring match.
    pub enhanced_actor_search: bool,
    /// Evaluate the global search term in memory across several columns
    /// instead of pushing it down as an exact subject id.
    pub intercept_global_search: bool,
    /// Candidate-set size above which the in-memory path logs a warning.
    pub materialization_warn_threshold: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: defaults::DEFAULT_PAGE_SIZE,
            max_page_size: defaults::DEFAULT_MAX_PAGE_SIZE,
            enhanced_actor_search: defaults::DEFAULT_ENHANCED_ACTOR_SEARCH,
            intercept_global_search: defaults::DEFAULT_INTERCEPT_GLOBAL_SEARCH,
            materialization_warn_threshold: defaults::DEFAULT_MATERIALIZATION_WARN_THRESHOLD,
        }
    }
}
