// Single source of truth for all default values.

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "chronicle.db";
pub const DEFAULT_WAL_MODE: bool = true;
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;
pub const DEFAULT_ENHANCED_SEARCH: bool = true;
pub const DEFAULT_HANDLE_CACHE_CAPACITY: u64 = 256;

// --- Query ---
pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_MAX_PAGE_SIZE: usize = 1_000;
pub const DEFAULT_ENHANCED_ACTOR_SEARCH: bool = true;
pub const DEFAULT_INTERCEPT_GLOBAL_SEARCH: bool = true;
pub const DEFAULT_MATERIALIZATION_WARN_THRESHOLD: usize = 10_000;

// --- Timeline ---
pub const DEFAULT_WINDOW_MINUTES: i64 = 5;
pub const DEFAULT_PARALLEL_FAN_OUT: bool = true;

// --- Actor ---
pub const DEFAULT_AUTOMATION_SENTINEL: &str = "automation";
