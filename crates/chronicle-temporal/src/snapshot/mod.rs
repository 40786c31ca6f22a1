//! Point-in-time snapshots of entity fields.

pub mod coerce;
pub mod collection;
mod reconstruct;

pub use reconstruct::{Snapshot, SnapshotReconstructor};
