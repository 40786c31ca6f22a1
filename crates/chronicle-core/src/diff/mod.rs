//! Change-set shape classification and human-readable summaries.

mod breakdown;
mod classifier;
mod format;
mod preview;

pub use breakdown::{detailed_breakdown, AssociationDiff, DetailedBreakdown, UpdateDiff};
pub use classifier::{classify, ChangeCategory};
pub use format::{format_value, format_value_default};
pub use preview::{create_preview, truncate_value, ChangePreview, PreviewEntry, PreviewKind};
