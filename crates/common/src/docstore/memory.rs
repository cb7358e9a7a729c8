use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::provider::{DocStoreError, Document, DocumentStore};

/// In-memory document store using nested maps.
#[derive(Debug, Clone)]
pub struct MemoryDocumentStore {
    inner: Arc<RwLock<MemoryDocumentStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryDocumentStoreInner {
    /// collection -> id -> document (BTreeMap keeps listing deterministic)
    collections: HashMap<String, BTreeMap<String, Document>>,
    /// collections whose writes should fail (test injection)
    failing_writes: HashSet<String>,
    /// collections whose reads should fail (test injection)
    failing_reads: HashSet<String>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryDocumentStoreError {
    #[error("memory store error: {0}")]
    Internal(String),
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryDocumentStoreInner::default())),
        }
    }

    /// Make every future write to `collection` fail.
    pub fn fail_writes(&self, collection: &str) {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.failing_writes.insert(collection.to_string());
    }

    /// Make every future read of `collection` fail.
    pub fn fail_reads(&self, collection: &str) {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.failing_reads.insert(collection.to_string());
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error(e: impl std::fmt::Display) -> DocStoreError<MemoryDocumentStoreError> {
    DocStoreError::Provider(MemoryDocumentStoreError::Internal(format!(
        "failed to acquire lock: {}",
        e
    )))
}

fn injected(collection: &str) -> DocStoreError<MemoryDocumentStoreError> {
    DocStoreError::Provider(MemoryDocumentStoreError::Internal(format!(
        "injected failure for collection {}",
        collection
    )))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    type Error = MemoryDocumentStoreError;

    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, DocStoreError<Self::Error>> {
        let inner = self.inner.read().map_err(lock_error)?;
        if inner.failing_reads.contains(collection) {
            return Err(injected(collection));
        }
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn put(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), DocStoreError<Self::Error>> {
        let mut inner = self.inner.write().map_err(lock_error)?;
        if inner.failing_writes.contains(collection) {
            return Err(injected(collection));
        }
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: serde_json::Map<String, Document>,
    ) -> Result<(), DocStoreError<Self::Error>> {
        let mut inner = self.inner.write().map_err(lock_error)?;
        if inner.failing_writes.contains(collection) {
            return Err(injected(collection));
        }
        let document = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| DocStoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        if let Some(object) = document.as_object_mut() {
            for (key, value) in fields {
                object.insert(key, value);
            }
        }
        Ok(())
    }

    async fn delete(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<(), DocStoreError<Self::Error>> {
        let mut inner = self.inner.write().map_err(lock_error)?;
        if inner.failing_writes.contains(collection) {
            return Err(injected(collection));
        }
        if let Some(docs) = inner.collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn list(
        &self,
        collection: &str,
        filter: Option<(&str, &Document)>,
    ) -> Result<Vec<(String, Document)>, DocStoreError<Self::Error>> {
        let inner = self.inner.read().map_err(lock_error)?;
        if inner.failing_reads.contains(collection) {
            return Err(injected(collection));
        }
        let Some(docs) = inner.collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .filter(|(_, doc)| match filter {
                Some((field, value)) => doc.get(field) == Some(value),
                None => true,
            })
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect())
    }
}
