//! Integration tests for the access policy store

use chrono::{Duration, Utc};
use common::docstore::DocumentStore;
use common::policy::{
    PolicyError, PolicyInput, PolicyKind, PolicyPatch, PolicyTarget, ID_LEN, MAX_LABEL_LEN,
};
use common::snapshot::Snapshot;
use common::testkit::TestEnv;

fn item_input(url: &str) -> PolicyInput {
    PolicyInput::new(PolicyTarget::Item {
        url: url.to_string(),
    })
}

fn container_input(container_id: &str) -> PolicyInput {
    PolicyInput::new(PolicyTarget::Container {
        container_id: container_id.to_string(),
    })
}

#[tokio::test]
async fn test_create_item_policy() {
    let env = TestEnv::new();
    let id = env
        .store
        .create(
            PolicyKind::Files,
            item_input("https://drive.google.com/file/d/abc/view"),
        )
        .await
        .unwrap();
    assert_eq!(id.len(), ID_LEN);

    let (policy, context) = env.store.get(&id).await.unwrap();
    assert!(!policy.is_container);
    assert_eq!(
        policy.target_url.as_deref(),
        Some("https://drive.google.com/file/d/abc/view")
    );
    // single-item policies carry no snapshot
    assert!(policy.snapshot.is_none());
    assert_eq!(policy.total_item_count, 0);
    assert_eq!(policy.created_at, policy.updated_at);

    assert_eq!(context.collection, "qr_files");
    assert!(!context.show_overlay);
}

#[tokio::test]
async fn test_create_container_policy_snapshots_at_share_time() {
    let env = TestEnv::new();
    let folder_b = env.seed_basic_tree();

    let id = env
        .store
        .create(PolicyKind::Files, container_input(&folder_b))
        .await
        .unwrap();

    let (policy, _) = env.store.get(&id).await.unwrap();
    assert!(policy.is_container);
    assert_eq!(policy.container_id.as_deref(), Some(folder_b.as_str()));
    assert!(policy
        .target_url
        .as_deref()
        .unwrap()
        .contains("/drive/folders/"));

    // container policies always carry a snapshot
    let snapshot = policy.snapshot.as_ref().unwrap();
    assert!(snapshot.is_nested());
    assert_eq!(policy.total_item_count, 2);

    // mutating storage afterwards does not change the stored snapshot
    env.storage.add_file(&folder_b, "late.txt");
    let (unchanged, _) = env.store.get(&id).await.unwrap();
    assert_eq!(unchanged.total_item_count, 2);
}

#[tokio::test]
async fn test_tour_policies_use_the_flat_shape() {
    let env = TestEnv::new();
    let folder_b = env.seed_basic_tree();

    let id = env
        .store
        .create(PolicyKind::Tours, container_input(&folder_b))
        .await
        .unwrap();

    let (policy, context) = env.store.get(&id).await.unwrap();
    match policy.snapshot.as_ref().unwrap() {
        Snapshot::Flat(entries) => {
            let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
            assert_eq!(names, vec!["fileC", "fileD"]);
        }
        Snapshot::Nested(_) => panic!("tour snapshot should be flat"),
    }
    assert_eq!(context.collection, "qr_tours");
    // overlay-capable collection, document defaults to showing it
    assert!(context.show_overlay);
}

#[tokio::test]
async fn test_get_checks_collections_in_priority_order() {
    let env = TestEnv::new();

    // the same id planted in both collections; the files collection wins
    let document = serde_json::json!({
        "id": "dup00001",
        "is_container": false,
        "target_url": "https://example.com/files-copy",
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z",
    });
    env.docs.put("qr_files", "dup00001", document.clone()).await.unwrap();
    let mut tours_copy = document;
    tours_copy["target_url"] = serde_json::json!("https://example.com/tours-copy");
    env.docs.put("qr_tours", "dup00001", tours_copy).await.unwrap();

    let (policy, context) = env.store.get("dup00001").await.unwrap();
    assert_eq!(context.collection, "qr_files");
    assert_eq!(
        policy.target_url.as_deref(),
        Some("https://example.com/files-copy")
    );
}

#[tokio::test]
async fn test_get_unknown_id_is_not_found() {
    let env = TestEnv::new();
    let result = env.store.get("missing1").await;
    assert!(matches!(result, Err(PolicyError::NotFound(_))));
}

#[tokio::test]
async fn test_refresh_snapshot_picks_up_new_items() {
    let env = TestEnv::new();
    let folder_b = env.seed_basic_tree();
    let id = env
        .store
        .create(PolicyKind::Files, container_input(&folder_b))
        .await
        .unwrap();

    env.storage.add_file(&folder_b, "fileE");
    let nested = env.storage.add_container(&folder_b, "nested");
    env.storage.add_file(&nested, "deep.txt");

    let refreshed = env.store.refresh_snapshot(&id).await.unwrap();
    // fileC, fileD, fileE, nested, deep.txt
    assert_eq!(refreshed.total_item_count, 5);
    assert!(refreshed.updated_at > refreshed.created_at);

    // the refreshed tree is what get() now returns
    let (persisted, _) = env.store.get(&id).await.unwrap();
    assert_eq!(persisted.total_item_count, 5);
}

#[tokio::test]
async fn test_refresh_snapshot_rejects_item_policies() {
    let env = TestEnv::new();
    let id = env
        .store
        .create(PolicyKind::Files, item_input("https://example.com"))
        .await
        .unwrap();
    let result = env.store.refresh_snapshot(&id).await;
    assert!(matches!(result, Err(PolicyError::NotContainer(_))));

    let result = env.store.refresh_snapshot("missing1").await;
    assert!(matches!(result, Err(PolicyError::NotFound(_))));
}

#[tokio::test]
async fn test_refresh_snapshot_propagates_upstream_failure() {
    let env = TestEnv::new();
    let folder_b = env.seed_basic_tree();
    let id = env
        .store
        .create(PolicyKind::Files, container_input(&folder_b))
        .await
        .unwrap();

    env.storage.fail_listing(&folder_b);
    let result = env.store.refresh_snapshot(&id).await;
    assert!(matches!(result, Err(PolicyError::Upstream(_))));
}

#[tokio::test]
async fn test_update_patches_fields_without_touching_created_at() {
    let env = TestEnv::new();
    let id = env
        .store
        .create(PolicyKind::Files, item_input("https://example.com"))
        .await
        .unwrap();
    let (original, _) = env.store.get(&id).await.unwrap();

    let patch = PolicyPatch {
        note: Some(Some("<p>read me</p>".to_string())),
        password: Some(Some("secret".to_string())),
        label: Some(Some("site plans".to_string())),
        expiration: Some(Some(Utc::now() + Duration::days(7))),
        ..Default::default()
    };
    env.store.update(&id, patch).await.unwrap();

    let (updated, _) = env.store.get(&id).await.unwrap();
    assert_eq!(updated.note.as_deref(), Some("<p>read me</p>"));
    assert_eq!(updated.password.as_deref(), Some("secret"));
    assert_eq!(updated.label.as_deref(), Some("site plans"));
    assert!(updated.expiration.is_some());
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.updated_at > original.updated_at);

    // clearing a field persists as absent
    let clear = PolicyPatch {
        password: Some(None),
        ..Default::default()
    };
    env.store.update(&id, clear).await.unwrap();
    let (cleared, _) = env.store.get(&id).await.unwrap();
    assert!(cleared.password.is_none());
    assert_eq!(cleared.note.as_deref(), Some("<p>read me</p>"));
}

#[tokio::test]
async fn test_label_cap_enforced() {
    let env = TestEnv::new();
    let long_label = "x".repeat(MAX_LABEL_LEN + 1);

    let mut input = item_input("https://example.com");
    input.label = Some(long_label.clone());
    let result = env.store.create(PolicyKind::Files, input).await;
    assert!(matches!(result, Err(PolicyError::LabelTooLong(59))));

    let id = env
        .store
        .create(PolicyKind::Files, item_input("https://example.com"))
        .await
        .unwrap();
    let patch = PolicyPatch {
        label: Some(Some(long_label)),
        ..Default::default()
    };
    let result = env.store.update(&id, patch).await;
    assert!(matches!(result, Err(PolicyError::LabelTooLong(59))));

    // exactly at the cap is fine
    let patch = PolicyPatch {
        label: Some(Some("x".repeat(MAX_LABEL_LEN))),
        ..Default::default()
    };
    env.store.update(&id, patch).await.unwrap();
}
