//! # chronicle-temporal
//!
//! Historical field values: take an entity's current state and undo every
//! recorded update newer than the requested moment.

pub mod snapshot;

pub use snapshot::{Snapshot, SnapshotReconstructor};
