/**
 * The Storage API collaborator.
 *  A narrow trait over the cloud drive (list children, metadata,
 *  upload, delete, create container), with a memory-backed
 *  implementation for tests and virtual trees, a REST adapter for
 *  the real provider, and the sequential upload queue.
 */
mod drive;
mod memory;
mod provider;
mod upload;

pub use drive::{DriveStorageError, DriveStorageProvider};
pub use memory::{MemoryStorageProvider, MemoryStorageProviderError, ROOT_CONTAINER_ID};
pub use provider::{ItemKind, ItemMetadata, ProgressFn, StorageError, StorageProvider};
pub use upload::{UploadEvent, UploadOutcome, UploadRequest, UploadStatus, Uploader};
