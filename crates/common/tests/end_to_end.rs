//! End-to-end scenarios: snapshot a tree, mint a share, resolve it through
//! the gate, browse the result offline.

use common::gate::{GateState, ResolvedTarget};
use common::navigator::{Navigator, OpenOutcome};
use common::policy::{PolicyInput, PolicyKind, PolicyTarget};
use common::snapshot::count_entries;
use common::storage::ROOT_CONTAINER_ID;
use common::testkit::TestEnv;

#[tokio::test]
async fn test_share_and_browse_a_folder() {
    let env = TestEnv::with_max_depth(5);

    // root = [fileA, folderB = [fileC, fileD]]
    env.storage.add_file(ROOT_CONTAINER_ID, "fileA");
    let folder_b = env.storage.add_container(ROOT_CONTAINER_ID, "folderB");
    env.storage.add_file(&folder_b, "fileC");
    env.storage.add_file(&folder_b, "fileD");

    let mut input = PolicyInput::new(PolicyTarget::Container {
        container_id: ROOT_CONTAINER_ID.to_string(),
    });
    input.label = Some("Shared".to_string());
    let id = env.store.create(PolicyKind::Files, input).await.unwrap();

    // second client resolves the minted id
    let mut session = env.gate.load(&id).await.unwrap();
    assert_eq!(session.state(), &GateState::Authorized);
    let resolution = env.gate.resolve(&mut session, None).await.unwrap();

    let snapshot = match &resolution.target {
        ResolvedTarget::Folder { snapshot } => snapshot.clone(),
        other => panic!("expected a folder, got {:?}", other),
    };
    match &snapshot {
        common::snapshot::Snapshot::Nested(entries) => {
            assert_eq!(count_entries(entries), 4);
        }
        _ => panic!("file shares snapshot as nested trees"),
    }

    let label = resolution.display_label.as_deref().unwrap_or("Folder Contents");
    let mut nav = Navigator::new(label, &snapshot);
    assert_eq!(nav.open(&folder_b), OpenOutcome::Entered);
    assert_eq!(nav.breadcrumbs(), vec!["Shared", "folderB"]);
    nav.back();
    assert_eq!(nav.breadcrumbs(), vec!["Shared"]);
}

#[tokio::test]
async fn test_password_gate_end_to_end() {
    let env = TestEnv::new();

    let mut input = PolicyInput::new(PolicyTarget::Item {
        url: "https://drive.google.com/file/d/abc/view".to_string(),
    });
    input.password = Some("abc".to_string());
    let id = env.store.create(PolicyKind::Files, input).await.unwrap();

    let mut session = env.gate.load(&id).await.unwrap();

    // wrong password: still gated, transient error present, then cleared
    assert!(!session.submit_password("abd"));
    assert!(matches!(session.state(), GateState::Gated { .. }));
    assert!(session.password_error().is_some());
    session.clear_password_error();
    assert!(session.password_error().is_none());

    // right password: authorized, resolved, audited
    assert!(session.submit_password("abc"));
    let resolution = env.gate.resolve(&mut session, Some("visitor")).await.unwrap();
    assert!(matches!(resolution.target, ResolvedTarget::File { .. }));

    let rows = env.audit.list(Some("qr_files")).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].1.visitor.as_deref(), Some("visitor"));
}

#[tokio::test]
async fn test_refresh_then_reresolve_serves_the_new_tree() {
    let env = TestEnv::new();
    let folder_b = env.storage.add_container(ROOT_CONTAINER_ID, "folderB");
    env.storage.add_file(&folder_b, "fileC");

    let input = PolicyInput::new(PolicyTarget::Container {
        container_id: folder_b.clone(),
    });
    let id = env.store.create(PolicyKind::Files, input).await.unwrap();

    // the world changes; an explicit refresh re-snapshots it
    env.storage.add_file(&folder_b, "fileD");
    env.store.refresh_snapshot(&id).await.unwrap();

    let mut session = env.gate.load(&id).await.unwrap();
    let resolution = env.gate.resolve(&mut session, None).await.unwrap();
    match resolution.target {
        ResolvedTarget::Folder { snapshot } => assert_eq!(snapshot.total_items(), 2),
        other => panic!("expected a folder, got {:?}", other),
    }
}
