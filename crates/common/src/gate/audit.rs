use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::docstore::{DocStoreError, DocumentStore};

/// Collection the access log lives in.
pub const AUDIT_COLLECTION: &str = "qr_access_logs";

/// Most rows the operator listing will return.
pub const AUDIT_ROW_LIMIT: usize = 800;

/// One successful resolution of a shareable identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub qr_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor: Option<String>,
    pub is_container: bool,
    /// Which policy collection the id matched.
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

/// Access log over the document store.
///
/// The gate's write is best-effort (the caller swallows failures); the
/// operator-facing list/delete surface propagates errors normally.
#[derive(Debug, Clone)]
pub struct AuditLog<D: DocumentStore> {
    docs: D,
    collection: String,
}

impl<D: DocumentStore> AuditLog<D> {
    pub fn new(docs: D) -> Self {
        Self {
            docs,
            collection: AUDIT_COLLECTION.to_string(),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Append one record, returning its generated id.
    pub async fn record(&self, record: &AuditRecord) -> Result<String, DocStoreError<D::Error>> {
        let id = Uuid::new_v4().to_string();
        // AuditRecord has a fixed, serializable shape
        let document = serde_json::to_value(record).expect("audit record serializes");
        self.docs.put(&self.collection, &id, document).await?;
        Ok(id)
    }

    /// List records, newest first, optionally filtered by source collection.
    /// Capped at [`AUDIT_ROW_LIMIT`] rows after sorting.
    pub async fn list(
        &self,
        source: Option<&str>,
    ) -> Result<Vec<(String, AuditRecord)>, DocStoreError<D::Error>> {
        let filter_value = source.map(|s| serde_json::Value::String(s.to_string()));
        let filter = filter_value.as_ref().map(|v| ("source", v));
        let rows = self.docs.list(&self.collection, filter).await?;

        let mut records: Vec<(String, AuditRecord)> = rows
            .into_iter()
            .filter_map(|(id, doc)| match serde_json::from_value(doc) {
                Ok(record) => Some((id, record)),
                Err(err) => {
                    tracing::warn!("skipping malformed access log row {}: {}", id, err);
                    None
                }
            })
            .collect();
        records.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp));
        records.truncate(AUDIT_ROW_LIMIT);
        Ok(records)
    }

    /// Delete one record by id.
    pub async fn delete(&self, id: &str) -> Result<(), DocStoreError<D::Error>> {
        self.docs.delete(&self.collection, id).await
    }
}
