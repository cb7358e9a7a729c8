use common::docstore::MemoryDocumentStore;
use common::gate::{AccessGate, AuditLog};
use common::policy::{PolicyInput, PolicyKind, PolicyStore, PolicyTarget};
use common::snapshot::SnapshotBuilder;
use common::storage::{MemoryStorageProvider, ROOT_CONTAINER_ID};

use super::config::Config;

/// Main gateway state - the access gate over the wired collaborators.
///
/// The standalone binary runs over the in-memory collaborators; a deployment
/// against real backends swaps the two provider types here and nothing else.
#[derive(Clone)]
pub struct State {
    gate: AccessGate<MemoryDocumentStore, MemoryStorageProvider>,
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("failed to seed demo share: {0}")]
    DemoSeed(String),
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        let storage = MemoryStorageProvider::new();
        let docs = MemoryDocumentStore::new();
        let builder = SnapshotBuilder::new(storage.clone());
        let store = PolicyStore::new(docs.clone(), builder);
        let audit = AuditLog::new(docs);
        let gate = AccessGate::new(store.clone(), audit);

        if config.seed_demo {
            let folder = storage.add_container(ROOT_CONTAINER_ID, "demo");
            storage.add_file(&folder, "welcome.pdf");
            storage.add_file(&folder, "floorplan.png");

            let mut input = PolicyInput::new(PolicyTarget::Container {
                container_id: folder,
            });
            input.label = Some("Demo share".to_string());
            let id = store
                .create(PolicyKind::Files, input)
                .await
                .map_err(|e| StateSetupError::DemoSeed(e.to_string()))?;
            tracing::info!("demo share ready at /qr/{}", id);
        }

        Ok(Self { gate })
    }

    pub fn gate(&self) -> &AccessGate<MemoryDocumentStore, MemoryStorageProvider> {
        &self.gate
    }
}
