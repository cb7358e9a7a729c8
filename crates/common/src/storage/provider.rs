use std::fmt::{Debug, Display};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Whether a storage item can hold other items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    File,
    Container,
}

impl ItemKind {
    pub fn is_container(&self) -> bool {
        matches!(self, ItemKind::Container)
    }
}

/// Metadata for one storage item, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

/// Callback invoked with percentage progress (0-100) during an upload.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum StorageError<T> {
    /// The underlying provider failed in a way the core does not interpret
    #[error("unhandled storage provider error: {0}")]
    Provider(#[from] T),
    /// The item or container does not exist
    #[error("item not found: {0}")]
    NotFound(String),
    /// The upload was cancelled through its cancellation token
    #[error("upload cancelled: {0}")]
    Cancelled(String),
}

/// The Storage API collaborator.
///
/// Everything the core needs from the cloud drive: child listing for
/// snapshot traversal, metadata lookup, and the mutation surface used by
/// the upload queue. Authentication is the caller's concern; implementations
/// carry whatever bearer credential they were constructed with.
#[async_trait]
pub trait StorageProvider: Send + Sync + Clone + 'static {
    type Error: Display + Debug + Send + Sync;

    /// List the immediate children of a container.
    ///
    /// # Arguments
    /// * `container_id` - The id of the container to list
    ///
    /// # Returns
    /// * `Ok(Vec<ItemMetadata>)` - The children, in provider order
    /// * `Err(StorageError::NotFound)` - The container does not exist
    async fn list_children(
        &self,
        container_id: &str,
    ) -> Result<Vec<ItemMetadata>, StorageError<Self::Error>>;

    /// Fetch metadata for a single item.
    async fn get_metadata(&self, item_id: &str)
        -> Result<ItemMetadata, StorageError<Self::Error>>;

    /// Create a new container under `parent_id` and return its id.
    async fn create_container(
        &self,
        parent_id: &str,
        name: &str,
    ) -> Result<String, StorageError<Self::Error>>;

    /// Upload a file into a container and return the new item's id.
    ///
    /// `progress` fires repeatedly over the upload's lifetime with a 0-100
    /// percentage. The upload must observe `cancel` and fail with
    /// `StorageError::Cancelled` once the token is tripped; a cancelled
    /// upload must not leave the item visible in the container.
    async fn upload_item(
        &self,
        container_id: &str,
        name: &str,
        bytes: Bytes,
        progress: ProgressFn,
        cancel: CancellationToken,
    ) -> Result<String, StorageError<Self::Error>>;

    /// Delete an item (file or container) by id.
    async fn delete_item(&self, item_id: &str) -> Result<(), StorageError<Self::Error>>;
}
