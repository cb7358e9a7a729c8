/// Lightweight harness for exercising the core over the in-memory
/// collaborators, without external infrastructure.
///
/// # Example
///
/// ```rust,ignore
/// use common::policy::{PolicyInput, PolicyKind, PolicyTarget};
/// use common::storage::ROOT_CONTAINER_ID;
/// use common::testkit::TestEnv;
///
/// #[tokio::test]
/// async fn test_share_a_folder() {
///     let env = TestEnv::new();
///     let folder = env.storage.add_container(ROOT_CONTAINER_ID, "plans");
///     env.storage.add_file(&folder, "site.pdf");
///
///     let input = PolicyInput::new(PolicyTarget::Container { container_id: folder });
///     let id = env.store.create(PolicyKind::Files, input).await.unwrap();
///     let session = env.gate.load(&id).await.unwrap();
///     // drive the gate...
/// }
/// ```
use crate::docstore::MemoryDocumentStore;
use crate::gate::{AccessGate, AuditLog};
use crate::policy::PolicyStore;
use crate::snapshot::SnapshotBuilder;
use crate::storage::{MemoryStorageProvider, ROOT_CONTAINER_ID};

/// Everything wired over memory providers, sharing one document store and
/// one storage tree.
pub struct TestEnv {
    pub storage: MemoryStorageProvider,
    pub docs: MemoryDocumentStore,
    pub store: PolicyStore<MemoryDocumentStore, MemoryStorageProvider>,
    pub gate: AccessGate<MemoryDocumentStore, MemoryStorageProvider>,
    pub audit: AuditLog<MemoryDocumentStore>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_max_depth(crate::snapshot::DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: u32) -> Self {
        let storage = MemoryStorageProvider::new();
        let docs = MemoryDocumentStore::new();
        let builder = SnapshotBuilder::new(storage.clone()).with_max_depth(max_depth);
        let store = PolicyStore::new(docs.clone(), builder);
        let audit = AuditLog::new(docs.clone());
        let gate = AccessGate::new(store.clone(), audit.clone());
        Self {
            storage,
            docs,
            store,
            gate,
            audit,
        }
    }

    /// Seed the canonical test tree: `root = [fileA, folderB = [fileC, fileD]]`.
    /// Returns the id of `folderB`.
    pub fn seed_basic_tree(&self) -> String {
        self.storage.add_file(ROOT_CONTAINER_ID, "fileA");
        let folder_b = self.storage.add_container(ROOT_CONTAINER_ID, "folderB");
        self.storage.add_file(&folder_b, "fileC");
        self.storage.add_file(&folder_b, "fileD");
        folder_b
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
