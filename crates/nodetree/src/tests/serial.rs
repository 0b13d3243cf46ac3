// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::serial::UPDATE_DATE_FORMAT;
use chrono::NaiveDateTime;

#[tokio::test]
async fn test_snapshot_renders_as_tree() {
    let (mut tree, _backend) = create_test_tree().await;
    tree.scan_recursive().await.unwrap();

    let snapshot = tree.serializable("/").unwrap();
    assert_eq!(snapshot.count(), tree.len());
    let expected = [
        "/",
        "├── a.txt",
        "├─┬ docs/",
        "│ ├─┬ deep/",
        "│ │ └── note.md",
        "│ └── readme.md",
        "└─┬ media/",
        "  └── song.mp3",
    ];
    assert_eq!(
        snapshot.to_tree_node().to_string(),
        format!("{}\n", expected.join("\n"))
    );
}

#[tokio::test]
async fn test_snapshot_does_no_io() {
    let (mut tree, backend) = create_test_tree().await;
    tree.scan("/").await.unwrap();
    backend.remove("/a.txt").await;

    // Unscanned directories appear empty; stale entries are still there
    let snapshot = tree.serializable("/").unwrap();
    assert_eq!(snapshot.count(), 4);
    assert!(snapshot.children.iter().all(|c| c.children.is_empty()));
    assert!(snapshot.children.iter().any(|c| c.name == "a.txt"));
}

#[tokio::test]
async fn test_snapshot_json_fields() {
    let (mut tree, _backend) = create_test_tree().await;
    tree.scan("/").await.unwrap();

    let json = serde_json::to_value(tree.serializable("/").unwrap()).unwrap();
    assert_eq!(json["isRoot"], true);
    assert_eq!(json["fullPath"], "/");
    assert_eq!(json["kind"], "Directory");

    let file = &json["children"][0];
    assert_eq!(file["name"], "a.txt");
    assert_eq!(file["extension"], "txt");
    assert_eq!(file["kind"], "File");
    assert_eq!(file["isRoot"], false);
    let date = file["updateDate"].as_str().unwrap();
    assert!(NaiveDateTime::parse_from_str(date, UPDATE_DATE_FORMAT).is_ok());
}
