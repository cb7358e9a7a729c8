use crate::locator;
use crate::storage::{StorageError, StorageProvider};

use super::entry::{FlatEntry, SnapshotEntry};

/// Default recursion bound. Deep trees are truncated silently at this depth;
/// the bound exists to keep a runaway tree from hammering the Storage API.
pub const DEFAULT_MAX_DEPTH: u32 = 5;

#[derive(thiserror::Error, Debug)]
pub enum SnapshotError<T> {
    #[error("failed to list container contents: {0}")]
    Storage(#[from] StorageError<T>),
}

/// Builds point-in-time snapshots of a container's contents by walking the
/// Storage API's child listings.
///
/// If the top-level listing fails the whole build fails; a failure while
/// recursing into a nested container is captured on that node
/// (`fetch_error`, empty children) and traversal of its siblings continues.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder<S: StorageProvider> {
    storage: S,
    max_depth: u32,
}

impl<S: StorageProvider> SnapshotBuilder<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Materialize the nested tree under `container_id`.
    pub async fn build(
        &self,
        container_id: &str,
    ) -> Result<Vec<SnapshotEntry>, SnapshotError<S::Error>> {
        self.build_level(container_id, 0).await
    }

    async fn build_level(
        &self,
        container_id: &str,
        depth: u32,
    ) -> Result<Vec<SnapshotEntry>, SnapshotError<S::Error>> {
        if depth >= self.max_depth {
            // silent truncation at the depth bound, not an error
            return Ok(Vec::new());
        }

        let children = self.storage.list_children(container_id).await?;
        let mut entries = Vec::with_capacity(children.len());
        for child in children {
            let link = locator::resource_url(child.kind.is_container(), &child.id);
            if child.kind.is_container() {
                let mut entry = SnapshotEntry::container(child.id.clone(), child.name, link, depth);
                match Box::pin(self.build_level(&child.id, depth + 1)).await {
                    Ok(nested) => entry.children = Some(nested),
                    Err(err) => {
                        tracing::warn!(
                            "failed to fetch nested container {}: {}",
                            child.id,
                            err
                        );
                        entry.children = Some(Vec::new());
                        entry.fetch_error =
                            Some(format!("failed to fetch nested contents: {}", err));
                    }
                }
                entries.push(entry);
            } else {
                entries.push(SnapshotEntry::file(child.id, child.name, link, depth));
            }
        }
        Ok(entries)
    }

    /// Flatten everything under `container_id` into leaf files only.
    ///
    /// Recursion has no depth bound here; a branch that fails to list is
    /// skipped (logged) and its siblings keep contributing.
    pub async fn build_flat(
        &self,
        container_id: &str,
    ) -> Result<Vec<FlatEntry>, SnapshotError<S::Error>> {
        let mut entries = Vec::new();
        self.collect_flat(container_id, &mut entries).await?;
        Ok(entries)
    }

    async fn collect_flat(
        &self,
        container_id: &str,
        entries: &mut Vec<FlatEntry>,
    ) -> Result<(), SnapshotError<S::Error>> {
        let children = self.storage.list_children(container_id).await?;
        for child in children {
            if child.kind.is_container() {
                if let Err(err) = Box::pin(self.collect_flat(&child.id, entries)).await {
                    tracing::warn!("skipping container {} while flattening: {}", child.id, err);
                }
            } else {
                entries.push(FlatEntry {
                    name: child.name,
                    url: locator::resource_url(false, &child.id),
                });
            }
        }
        Ok(())
    }
}
