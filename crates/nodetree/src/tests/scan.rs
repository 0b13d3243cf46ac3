// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::error::Error;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_scan_is_shallow() {
    let (mut tree, _backend) = create_test_tree().await;
    tree.scan("/").await.unwrap();

    assert_eq!(tree.paths(), vec!["/", "/a.txt", "/docs", "/media"]);
    assert!(tree.children("/docs").unwrap().is_empty());
}

#[tokio::test]
async fn test_scan_is_idempotent() {
    let (mut tree, _backend) = create_test_tree().await;
    tree.scan_recursive().await.unwrap();
    let first: Vec<String> = tree.paths().into_iter().map(String::from).collect();
    let mut events = tree.subscribe();

    tree.scan_recursive().await.unwrap();
    let second: Vec<String> = tree.paths().into_iter().map(String::from).collect();
    assert_eq!(first, second);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_scan_picks_up_external_changes() {
    let (mut tree, backend) = create_test_tree().await;
    tree.scan_recursive().await.unwrap();

    backend.remove("/a.txt").await;
    backend.put_file("/b.txt", b"beta").await.unwrap();
    tree.scan("/").await.unwrap();

    assert!(!tree.exists("/a.txt"));
    assert_eq!(tree.get("/b.txt").unwrap().length(), 4);
    assert_consistent(&tree);
}

#[tokio::test]
async fn test_replaced_directory_heals_as_file() {
    let (mut tree, backend) = create_test_tree().await;
    tree.scan_recursive().await.unwrap();

    backend.remove("/docs").await;
    backend.put_file("/docs", b"now a file").await.unwrap();

    let result = tree.scan("/docs").await;
    assert!(matches!(result, Err(Error::EntityReplaced(ref p)) if p == "/docs"));
    assert!(result.unwrap_err().is_drift());

    let node = tree.get("/docs").unwrap();
    assert!(node.is_file());
    assert_eq!(node.length(), 10);
    assert!(!tree.exists("/docs/readme.md"));
    assert_consistent(&tree);
}

#[tokio::test]
async fn test_replaced_file_heals_as_scanned_directory() {
    let (mut tree, backend) = create_test_tree().await;
    tree.scan("/").await.unwrap();

    backend.remove("/a.txt").await;
    backend.put_file("/a.txt/inner.txt", b"i").await.unwrap();

    let result = tree.get_bytes("/a.txt").await;
    assert!(matches!(result, Err(Error::EntityReplaced(_))));
    assert!(tree.get("/a.txt").unwrap().is_dir());
    assert!(tree.exists("/a.txt/inner.txt"));
    assert_consistent(&tree);
}

#[tokio::test]
async fn test_vanished_entity_is_disposed() {
    let (mut tree, backend) = create_test_tree().await;
    tree.scan_recursive().await.unwrap();

    backend.remove("/media").await;
    let result = tree.scan("/media").await;
    assert!(matches!(result, Err(Error::EntityGone(_))));
    assert!(!tree.exists("/media"));
    assert!(!tree.exists("/media/song.mp3"));
    assert_consistent(&tree);
}

#[tokio::test]
async fn test_lost_root_is_not_disposed() {
    let backend = MemoryBackend::new();
    backend.put_file("/srv/x.txt", b"x").await.unwrap();
    let mut tree = Tree::new(std::sync::Arc::new(backend.clone()), "/srv")
        .await
        .unwrap();
    tree.scan("/srv").await.unwrap();

    backend.remove("/srv").await;
    let result = tree.scan("/srv").await;
    assert!(matches!(result, Err(Error::RootLost(_))));
    assert!(tree.exists("/srv"));
    assert!(tree.exists("/srv/x.txt"));

    let result = tree.scan_recursive().await;
    assert!(matches!(result, Err(Error::RootLost(_))));
}

#[tokio::test]
async fn test_denied_listing_is_skipped() {
    let (mut tree, backend) = create_test_tree().await;
    backend.deny_listing("/docs").await;

    tree.scan("/").await.unwrap();
    tree.scan("/docs").await.unwrap();
    assert!(tree.children("/docs").unwrap().is_empty());

    tree.scan_recursive().await.unwrap();
    assert!(tree.exists("/media/song.mp3"));
    assert!(!tree.exists("/docs/readme.md"));
}

#[tokio::test]
async fn test_recursive_scan_survives_vanishing_branch() {
    let (mut tree, backend) = create_test_tree().await;
    tree.scan("/").await.unwrap();
    backend.remove("/docs").await;

    // /docs is still cached but gone from the store
    tree.scan_recursive().await.unwrap();
    assert!(!tree.exists("/docs"));
    assert!(tree.exists("/media/song.mp3"));
    assert_consistent(&tree);
}

#[tokio::test]
async fn test_scan_subtree_stays_inside() {
    let (mut tree, _backend) = create_test_tree().await;
    tree.scan("/").await.unwrap();
    tree.scan_subtree("/docs").await.unwrap();

    assert!(tree.exists("/docs/deep/note.md"));
    assert!(!tree.exists("/media/song.mp3"));
}

#[tokio::test]
async fn test_cancelled_scan_stops() {
    let (mut tree, _backend) = create_test_tree().await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = tree.scan_recursive_with_cancel(&cancel).await;
    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(tree.len(), 1);
}

#[tokio::test]
async fn test_spawned_scan_returns_tree() {
    let (tree, _backend) = create_test_tree().await;

    let (tree, result) = tree.spawn_scan_recursive().await.unwrap();
    result.unwrap();
    assert_eq!(tree.len(), 8);
    assert_consistent(&tree);
}

#[tokio::test]
async fn test_spawned_scan_can_be_cancelled() {
    let (tree, _backend) = create_test_tree().await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let (tree, result) = tree.spawn_scan_recursive_with_cancel(cancel).await.unwrap();
    assert!(matches!(result, Err(Error::Cancelled)));
    assert_consistent(&tree);
}
