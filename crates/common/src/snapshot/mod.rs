/**
 * Folder snapshots.
 *  A snapshot is a materialized, point-in-time copy of a container's
 *  (possibly nested) contents, built once at share time so a shared
 *  link can serve a whole folder without repeated authenticated calls.
 */
mod builder;
mod entry;

pub use builder::{SnapshotBuilder, SnapshotError, DEFAULT_MAX_DEPTH};
pub use entry::{count_entries, EntryKind, FlatEntry, Snapshot, SnapshotEntry};
