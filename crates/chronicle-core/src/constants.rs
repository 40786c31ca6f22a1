/// Reserved change-set key holding the producer-attached request context.
pub const CONTEXT_KEY: &str = "@context";

/// Reserved change-set key holding a domain event name.
pub const EVENT_KEY: &str = "@event";

/// Prefix shared by every reserved change-set key.
pub const RESERVED_PREFIX: char = '@';

/// Strings longer than this are truncated in previews.
pub const PREVIEW_MAX_STRING_LEN: usize = 50;

/// Number of characters kept from a truncated preview string.
pub const PREVIEW_KEEP_STRING_LEN: usize = 47;

/// Sequences longer than this are truncated in previews.
pub const PREVIEW_MAX_ITEMS: usize = 3;

/// Default maximum length of `format_value` output.
pub const FORMAT_VALUE_MAX_LEN: usize = 100;

/// Prefix of every data-source identifier.
pub const IDENTIFIER_PREFIX: &str = "audit-";

/// Years added to "now" when a date range has no upper bound.
pub const OPEN_RANGE_YEARS: u32 = 100;
