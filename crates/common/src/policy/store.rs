use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::docstore::{DocStoreError, Document, DocumentStore};
use crate::locator;
use crate::snapshot::{Snapshot, SnapshotBuilder, SnapshotError};
use crate::storage::StorageProvider;

use super::document::{PolicyDocument, PolicyInput, PolicyPatch, PolicyTarget, MAX_LABEL_LEN};
use super::mint::mint_id;

/// Which flavor of share a collection holds. File shares snapshot containers
/// as nested trees; tour shares use the flat leaf-file shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Files,
    Tours,
}

/// One named policy collection in the document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSpec {
    pub name: String,
    pub kind: PolicyKind,
    /// Whether documents in this collection may ask the viewer for the
    /// branding overlay. Collections without it never show one.
    pub overlay_capable: bool,
}

/// The collections a store checks, in lookup priority order.
pub fn default_collections() -> Vec<CollectionSpec> {
    vec![
        CollectionSpec {
            name: "qr_files".to_string(),
            kind: PolicyKind::Files,
            overlay_capable: false,
        },
        CollectionSpec {
            name: "qr_tours".to_string(),
            kind: PolicyKind::Tours,
            overlay_capable: true,
        },
    ]
}

/// Immutable context produced once when an id is located, and passed down
/// through resolution instead of threading ambient flags around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionContext {
    /// Name of the collection the id matched.
    pub collection: String,
    pub kind: PolicyKind,
    /// Whether the viewer should render the branding overlay.
    pub show_overlay: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum PolicyError<DE, SE> {
    /// The id has no document in any checked collection
    #[error("no policy document for id {0}")]
    NotFound(String),
    /// The operation only applies to container policies
    #[error("policy {0} does not reference a container")]
    NotContainer(String),
    #[error("label exceeds {MAX_LABEL_LEN} characters (got {0})")]
    LabelTooLong(usize),
    #[error("persistence error: {0}")]
    Persistence(#[from] DocStoreError<DE>),
    #[error("upstream storage error: {0}")]
    Upstream(#[from] SnapshotError<SE>),
    #[error("failed to encode document fields: {0}")]
    Encode(#[from] serde_json::Error),
    /// The stored document no longer deserializes to a policy
    #[error("stored document {id} is corrupt: {source}")]
    Corrupt {
        id: String,
        source: serde_json::Error,
    },
}

/// Creates, locates, refreshes and updates policy documents across the
/// configured collections.
#[derive(Debug, Clone)]
pub struct PolicyStore<D: DocumentStore, S: StorageProvider> {
    docs: D,
    builder: SnapshotBuilder<S>,
    collections: Vec<CollectionSpec>,
}

impl<D: DocumentStore, S: StorageProvider> PolicyStore<D, S> {
    pub fn new(docs: D, builder: SnapshotBuilder<S>) -> Self {
        Self {
            docs,
            builder,
            collections: default_collections(),
        }
    }

    pub fn with_collections(mut self, collections: Vec<CollectionSpec>) -> Self {
        self.collections = collections;
        self
    }

    pub fn collections(&self) -> &[CollectionSpec] {
        &self.collections
    }

    fn collection_for(&self, kind: PolicyKind) -> &CollectionSpec {
        self.collections
            .iter()
            .find(|spec| spec.kind == kind)
            .unwrap_or(&self.collections[0])
    }

    fn check_label(label: Option<&str>) -> Result<(), PolicyError<D::Error, S::Error>> {
        if let Some(label) = label {
            let len = label.chars().count();
            if len > MAX_LABEL_LEN {
                return Err(PolicyError::LabelTooLong(len));
            }
        }
        Ok(())
    }

    fn decode(id: &str, document: Document) -> Result<PolicyDocument, PolicyError<D::Error, S::Error>> {
        serde_json::from_value(document).map_err(|source| PolicyError::Corrupt {
            id: id.to_string(),
            source,
        })
    }

    /// Mint an id, snapshot the target if it is a container, and persist a
    /// new policy document. Returns the minted id.
    pub async fn create(
        &self,
        kind: PolicyKind,
        input: PolicyInput,
    ) -> Result<String, PolicyError<D::Error, S::Error>> {
        Self::check_label(input.label.as_deref())?;

        let id = mint_id();
        let now = Utc::now();

        let (is_container, target_url, container_id, snapshot) = match input.target {
            PolicyTarget::Item { url } => (false, Some(url), None, None),
            PolicyTarget::Container { container_id } => {
                let snapshot = match kind {
                    PolicyKind::Files => Snapshot::Nested(self.builder.build(&container_id).await?),
                    PolicyKind::Tours => {
                        Snapshot::Flat(self.builder.build_flat(&container_id).await?)
                    }
                };
                (
                    true,
                    Some(locator::resource_url(true, &container_id)),
                    Some(container_id),
                    Some(snapshot),
                )
            }
        };

        let total_item_count = snapshot.as_ref().map(Snapshot::total_items).unwrap_or(0);
        let document = PolicyDocument {
            id: id.clone(),
            is_container,
            target_url,
            container_id,
            display_name: input.display_name,
            note: input.note,
            password: input.password,
            expiration: input.expiration,
            label: input.label,
            snapshot,
            total_item_count,
            show_overlay: input.show_overlay,
            created_at: now,
            updated_at: now,
        };

        let collection = self.collection_for(kind);
        self.docs
            .put(&collection.name, &id, serde_json::to_value(&document)?)
            .await?;
        Ok(id)
    }

    /// Look an id up across the collections, in priority order. The first
    /// match wins and fixes the [`ResolutionContext`] for everything
    /// downstream.
    pub async fn get(
        &self,
        id: &str,
    ) -> Result<(PolicyDocument, ResolutionContext), PolicyError<D::Error, S::Error>> {
        for spec in &self.collections {
            if let Some(document) = self.docs.get(&spec.name, id).await? {
                let policy = Self::decode(id, document)?;
                let context = ResolutionContext {
                    collection: spec.name.clone(),
                    kind: spec.kind,
                    show_overlay: spec.overlay_capable && policy.show_overlay,
                };
                return Ok((policy, context));
            }
        }
        Err(PolicyError::NotFound(id.to_string()))
    }

    /// Re-snapshot a container policy and persist the new tree.
    ///
    /// Concurrent refreshes of the same id are not coordinated; the last
    /// write wins. Returns the updated document.
    pub async fn refresh_snapshot(
        &self,
        id: &str,
    ) -> Result<PolicyDocument, PolicyError<D::Error, S::Error>> {
        let (mut policy, context) = self.get(id).await?;
        if !policy.is_container {
            return Err(PolicyError::NotContainer(id.to_string()));
        }
        let container_id = policy
            .container_id
            .clone()
            .ok_or_else(|| PolicyError::NotContainer(id.to_string()))?;

        let snapshot = match context.kind {
            PolicyKind::Files => Snapshot::Nested(self.builder.build(&container_id).await?),
            PolicyKind::Tours => Snapshot::Flat(self.builder.build_flat(&container_id).await?),
        };

        policy.total_item_count = snapshot.total_items();
        policy.snapshot = Some(snapshot);
        policy.updated_at = Utc::now();

        let mut fields = serde_json::Map::new();
        fields.insert(
            "snapshot".to_string(),
            serde_json::to_value(&policy.snapshot)?,
        );
        fields.insert(
            "total_item_count".to_string(),
            serde_json::to_value(policy.total_item_count)?,
        );
        fields.insert(
            "updated_at".to_string(),
            serde_json::to_value(policy.updated_at)?,
        );
        self.docs.update(&context.collection, id, fields).await?;
        Ok(policy)
    }

    /// Partially update note / password / expiration / label / target fields.
    /// Never touches `id` or `created_at`; always bumps `updated_at`.
    pub async fn update(
        &self,
        id: &str,
        patch: PolicyPatch,
    ) -> Result<(), PolicyError<D::Error, S::Error>> {
        if let Some(Some(label)) = &patch.label {
            Self::check_label(Some(label))?;
        }
        let (_, context) = self.get(id).await?;

        let mut fields = serde_json::Map::new();
        if let Some(note) = &patch.note {
            fields.insert("note".to_string(), serde_json::to_value(note)?);
        }
        if let Some(password) = &patch.password {
            fields.insert("password".to_string(), serde_json::to_value(password)?);
        }
        if let Some(expiration) = &patch.expiration {
            fields.insert("expiration".to_string(), serde_json::to_value(expiration)?);
        }
        if let Some(label) = &patch.label {
            fields.insert("label".to_string(), serde_json::to_value(label)?);
        }
        if let Some(target_url) = &patch.target_url {
            fields.insert("target_url".to_string(), serde_json::to_value(target_url)?);
        }
        if let Some(show_overlay) = patch.show_overlay {
            fields.insert(
                "show_overlay".to_string(),
                serde_json::to_value(show_overlay)?,
            );
        }
        fields.insert(
            "updated_at".to_string(),
            serde_json::to_value(Utc::now())?,
        );

        self.docs.update(&context.collection, id, fields).await?;
        Ok(())
    }
}
