/**
 * The Document Store collaborator.
 *  (collection, id)-keyed document database used for policy
 *  documents and access-log records.
 */
pub mod docstore;
/**
 * The access gate: expiration, note acknowledgement, password
 *  verification, resolution, and the best-effort access log.
 */
pub mod gate;
/**
 * Pure classification of storage-provider URLs into files,
 *  containers, and preview addresses.
 */
pub mod locator;
/**
 * Offline drill-down navigation over a resolved snapshot.
 */
pub mod navigator;
/**
 * Policy documents, identifier minting, and the store that
 *  persists them across prioritized collections.
 */
pub mod policy;
/**
 * Point-in-time folder snapshots with bounded-depth recursion
 *  and partial-failure isolation.
 */
pub mod snapshot;
/**
 * The Storage API collaborator, its memory and REST-backed
 *  implementations, and the sequential upload queue.
 */
pub mod storage;
/**
 * In-memory wiring helpers for tests and the standalone gateway.
 */
pub mod testkit;

pub mod prelude {
    pub use crate::gate::{AccessGate, GateSession, GateState, Resolution, ResolvedTarget};
    pub use crate::navigator::Navigator;
    pub use crate::policy::{PolicyDocument, PolicyInput, PolicyKind, PolicyStore, PolicyTarget};
    pub use crate::snapshot::{Snapshot, SnapshotBuilder, SnapshotEntry};
    pub use crate::storage::StorageProvider;
}
