use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use super::provider::{ItemKind, ItemMetadata, ProgressFn, StorageError, StorageProvider};

/// Id of the implicit root container every memory provider starts with.
pub const ROOT_CONTAINER_ID: &str = "root";

/// In-memory storage provider backed by a parent/child tree.
///
/// Used by tests and the standalone gateway; also stands in for virtual
/// folder trees that live entirely in a database rather than a real drive.
#[derive(Debug, Clone)]
pub struct MemoryStorageProvider {
    inner: Arc<RwLock<MemoryStorageProviderInner>>,
}

#[derive(Debug, Default)]
struct MemoryStorageProviderInner {
    /// item id -> metadata
    items: HashMap<String, ItemMetadata>,
    /// container id -> ordered child ids
    children: HashMap<String, Vec<String>>,
    /// container ids whose listing should fail (test injection)
    failing: HashSet<String>,
    /// monotonic id counter
    next_id: u64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryStorageProviderError {
    #[error("memory provider error: {0}")]
    Internal(String),
}

impl MemoryStorageProvider {
    pub fn new() -> Self {
        let provider = Self {
            inner: Arc::new(RwLock::new(MemoryStorageProviderInner::default())),
        };
        {
            let mut inner = provider.inner.write().expect("fresh lock");
            inner.items.insert(
                ROOT_CONTAINER_ID.to_string(),
                ItemMetadata {
                    id: ROOT_CONTAINER_ID.to_string(),
                    name: ROOT_CONTAINER_ID.to_string(),
                    kind: ItemKind::Container,
                    size: None,
                    modified_at: None,
                },
            );
            inner.children.insert(ROOT_CONTAINER_ID.to_string(), Vec::new());
        }
        provider
    }

    fn alloc_id(inner: &mut MemoryStorageProviderInner) -> String {
        inner.next_id += 1;
        format!("m{:04}", inner.next_id)
    }

    /// Seed a file under `parent_id`, returning its id.
    pub fn add_file(&self, parent_id: &str, name: &str) -> String {
        let mut inner = self.inner.write().expect("lock poisoned");
        let id = Self::alloc_id(&mut inner);
        inner.items.insert(
            id.clone(),
            ItemMetadata {
                id: id.clone(),
                name: name.to_string(),
                kind: ItemKind::File,
                size: Some(0),
                modified_at: Some(Utc::now()),
            },
        );
        inner
            .children
            .entry(parent_id.to_string())
            .or_default()
            .push(id.clone());
        id
    }

    /// Seed a container under `parent_id`, returning its id.
    pub fn add_container(&self, parent_id: &str, name: &str) -> String {
        let mut inner = self.inner.write().expect("lock poisoned");
        let id = Self::alloc_id(&mut inner);
        inner.items.insert(
            id.clone(),
            ItemMetadata {
                id: id.clone(),
                name: name.to_string(),
                kind: ItemKind::Container,
                size: None,
                modified_at: Some(Utc::now()),
            },
        );
        inner.children.insert(id.clone(), Vec::new());
        inner
            .children
            .entry(parent_id.to_string())
            .or_default()
            .push(id.clone());
        id
    }

    /// Make every future listing of `container_id` fail.
    pub fn fail_listing(&self, container_id: &str) {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.failing.insert(container_id.to_string());
    }
}

impl Default for MemoryStorageProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    type Error = MemoryStorageProviderError;

    async fn list_children(
        &self,
        container_id: &str,
    ) -> Result<Vec<ItemMetadata>, StorageError<Self::Error>> {
        let inner = self.inner.read().map_err(|e| {
            StorageError::Provider(MemoryStorageProviderError::Internal(format!(
                "failed to acquire read lock: {}",
                e
            )))
        })?;

        if inner.failing.contains(container_id) {
            return Err(StorageError::Provider(
                MemoryStorageProviderError::Internal(format!(
                    "injected listing failure for {}",
                    container_id
                )),
            ));
        }

        let ids = inner
            .children
            .get(container_id)
            .ok_or_else(|| StorageError::NotFound(container_id.to_string()))?;

        Ok(ids
            .iter()
            .filter_map(|id| inner.items.get(id).cloned())
            .collect())
    }

    async fn get_metadata(
        &self,
        item_id: &str,
    ) -> Result<ItemMetadata, StorageError<Self::Error>> {
        let inner = self.inner.read().map_err(|e| {
            StorageError::Provider(MemoryStorageProviderError::Internal(format!(
                "failed to acquire read lock: {}",
                e
            )))
        })?;

        inner
            .items
            .get(item_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(item_id.to_string()))
    }

    async fn create_container(
        &self,
        parent_id: &str,
        name: &str,
    ) -> Result<String, StorageError<Self::Error>> {
        {
            let inner = self.inner.read().map_err(|e| {
                StorageError::Provider(MemoryStorageProviderError::Internal(format!(
                    "failed to acquire read lock: {}",
                    e
                )))
            })?;
            if !inner.children.contains_key(parent_id) {
                return Err(StorageError::NotFound(parent_id.to_string()));
            }
        }
        Ok(self.add_container(parent_id, name))
    }

    async fn upload_item(
        &self,
        container_id: &str,
        name: &str,
        bytes: Bytes,
        progress: ProgressFn,
        cancel: CancellationToken,
    ) -> Result<String, StorageError<Self::Error>> {
        {
            let inner = self.inner.read().map_err(|e| {
                StorageError::Provider(MemoryStorageProviderError::Internal(format!(
                    "failed to acquire read lock: {}",
                    e
                )))
            })?;
            if !inner.children.contains_key(container_id) {
                return Err(StorageError::NotFound(container_id.to_string()));
            }
        }

        // Emit progress in quarters, checking the token between steps so a
        // cancelled upload never lands in the container.
        for pct in [25u8, 50, 75, 100] {
            if cancel.is_cancelled() {
                return Err(StorageError::Cancelled(name.to_string()));
            }
            progress(pct);
            tokio::task::yield_now().await;
        }
        if cancel.is_cancelled() {
            return Err(StorageError::Cancelled(name.to_string()));
        }

        let mut inner = self.inner.write().map_err(|e| {
            StorageError::Provider(MemoryStorageProviderError::Internal(format!(
                "failed to acquire write lock: {}",
                e
            )))
        })?;
        let id = Self::alloc_id(&mut inner);
        inner.items.insert(
            id.clone(),
            ItemMetadata {
                id: id.clone(),
                name: name.to_string(),
                kind: ItemKind::File,
                size: Some(bytes.len() as u64),
                modified_at: Some(Utc::now()),
            },
        );
        inner
            .children
            .entry(container_id.to_string())
            .or_default()
            .push(id.clone());
        Ok(id)
    }

    async fn delete_item(&self, item_id: &str) -> Result<(), StorageError<Self::Error>> {
        let mut inner = self.inner.write().map_err(|e| {
            StorageError::Provider(MemoryStorageProviderError::Internal(format!(
                "failed to acquire write lock: {}",
                e
            )))
        })?;

        if inner.items.remove(item_id).is_none() {
            return Err(StorageError::NotFound(item_id.to_string()));
        }

        // Detach from whichever container held it, then drop any subtree.
        for ids in inner.children.values_mut() {
            ids.retain(|id| id != item_id);
        }
        let mut pending = inner
            .children
            .remove(item_id)
            .unwrap_or_default();
        while let Some(id) = pending.pop() {
            inner.items.remove(&id);
            if let Some(grandchildren) = inner.children.remove(&id) {
                pending.extend(grandchildren);
            }
        }
        Ok(())
    }
}
