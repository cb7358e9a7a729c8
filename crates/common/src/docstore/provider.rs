use std::fmt::{Debug, Display};

use async_trait::async_trait;

/// Documents are schemaless JSON values; typed shapes are (de)serialized at
/// the call sites that own them.
pub type Document = serde_json::Value;

#[derive(thiserror::Error, Debug)]
pub enum DocStoreError<T> {
    /// The underlying store failed in a way the core does not interpret
    #[error("unhandled document store error: {0}")]
    Provider(#[from] T),
    /// A targeted mutation addressed a document that does not exist
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
}

/// The Document Store collaborator.
///
/// A document database keyed by `(collection, id)`: create/read/update/delete
/// plus a simple equality-filtered listing. No transactions; callers that
/// need read-modify-write do it optimistically (last write wins).
#[async_trait]
pub trait DocumentStore: Send + Sync + Clone + 'static {
    type Error: Display + Debug + Send + Sync;

    /// Fetch one document, `None` if absent.
    async fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, DocStoreError<Self::Error>>;

    /// Create or replace one document.
    async fn put(
        &self,
        collection: &str,
        id: &str,
        document: Document,
    ) -> Result<(), DocStoreError<Self::Error>>;

    /// Shallow-merge `fields` into an existing document.
    ///
    /// # Returns
    /// * `Err(DocStoreError::NotFound)` - no document exists at `(collection, id)`
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: serde_json::Map<String, Document>,
    ) -> Result<(), DocStoreError<Self::Error>>;

    /// Delete one document. Deleting an absent document is a no-op.
    async fn delete(&self, collection: &str, id: &str)
        -> Result<(), DocStoreError<Self::Error>>;

    /// List `(id, document)` pairs in a collection, optionally keeping only
    /// documents whose `field` equals `value`. Ordering is unspecified.
    async fn list(
        &self,
        collection: &str,
        filter: Option<(&str, &Document)>,
    ) -> Result<Vec<(String, Document)>, DocStoreError<Self::Error>>;
}
