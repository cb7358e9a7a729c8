//! Integration tests for the folder navigator

use common::navigator::{Navigator, OpenOutcome};
use common::snapshot::{Snapshot, SnapshotBuilder};
use common::storage::{MemoryStorageProvider, ROOT_CONTAINER_ID};

async fn snapshot_of(storage: &MemoryStorageProvider) -> Snapshot {
    let builder = SnapshotBuilder::new(storage.clone());
    Snapshot::Nested(builder.build(ROOT_CONTAINER_ID).await.unwrap())
}

#[tokio::test]
async fn test_drill_down_and_back_over_a_real_snapshot() {
    let storage = MemoryStorageProvider::new();
    storage.add_file(ROOT_CONTAINER_ID, "fileA");
    let folder_b = storage.add_container(ROOT_CONTAINER_ID, "folderB");
    storage.add_file(&folder_b, "fileC");
    let inner = storage.add_container(&folder_b, "inner");
    storage.add_file(&inner, "deep.txt");

    let snapshot = snapshot_of(&storage).await;
    let mut nav = Navigator::new("Shared", &snapshot);

    assert_eq!(nav.open(&folder_b), OpenOutcome::Entered);
    assert_eq!(nav.open(&inner), OpenOutcome::Entered);
    assert_eq!(nav.breadcrumbs(), vec!["Shared", "folderB", "inner"]);
    assert_eq!(nav.path(), "folderB/inner");
    assert_eq!(nav.current().len(), 1);
    assert_eq!(nav.current()[0].name, "deep.txt");

    assert!(nav.back());
    assert_eq!(nav.breadcrumbs(), vec!["Shared", "folderB"]);
    nav.to_root();
    assert!(nav.at_root());
    assert_eq!(nav.current().len(), 2);
}

#[tokio::test]
async fn test_open_pushes_exactly_one_frame_per_container() {
    let storage = MemoryStorageProvider::new();
    let folder_b = storage.add_container(ROOT_CONTAINER_ID, "folderB");
    storage.add_file(&folder_b, "fileC");

    let snapshot = snapshot_of(&storage).await;
    let mut nav = Navigator::new("root", &snapshot);

    assert_eq!(nav.breadcrumbs().len(), 1);
    nav.open(&folder_b);
    assert_eq!(nav.breadcrumbs().len(), 2);

    // one open, one back; more backs than opens stay at the root
    assert!(nav.back());
    assert!(!nav.back());
    assert!(!nav.back());
    assert_eq!(nav.breadcrumbs(), vec!["root"]);
    assert_eq!(nav.current().len(), 1);
}

#[tokio::test]
async fn test_navigation_is_offline_after_resolution() {
    let storage = MemoryStorageProvider::new();
    let folder_b = storage.add_container(ROOT_CONTAINER_ID, "folderB");
    storage.add_file(&folder_b, "fileC");

    let snapshot = snapshot_of(&storage).await;

    // once the snapshot is in hand, even a dead provider cannot break
    // navigation
    storage.fail_listing(ROOT_CONTAINER_ID);
    storage.fail_listing(&folder_b);

    let mut nav = Navigator::new("root", &snapshot);
    assert_eq!(nav.open(&folder_b), OpenOutcome::Entered);
    assert_eq!(nav.current()[0].name, "fileC");
}

#[tokio::test]
async fn test_empty_and_failed_containers_stay_navigable() {
    let storage = MemoryStorageProvider::new();
    let empty = storage.add_container(ROOT_CONTAINER_ID, "empty");
    let broken = storage.add_container(ROOT_CONTAINER_ID, "broken");
    storage.add_file(&broken, "hidden.txt");
    storage.fail_listing(&broken);

    let snapshot = snapshot_of(&storage).await;
    let mut nav = Navigator::new("root", &snapshot);

    // a failed branch surfaces its marker but still opens as empty
    let broken_entry = nav
        .current()
        .iter()
        .find(|entry| entry.id == broken)
        .unwrap();
    assert!(broken_entry.fetch_error.is_some());

    assert_eq!(nav.open(&empty), OpenOutcome::Entered);
    assert!(nav.current().is_empty());
    nav.back();
    assert_eq!(nav.open(&broken), OpenOutcome::Entered);
    assert!(nav.current().is_empty());
}
