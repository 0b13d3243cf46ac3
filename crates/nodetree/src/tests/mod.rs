// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Tree behavior against the in-memory backend

mod scan;
mod serial;

use crate::memory::{self, MemoryBackend};
use crate::tree::Tree;
use std::collections::BTreeSet;

/// A store holding:
///
/// ```text
/// /
/// ├── a.txt
/// ├─┬ docs/
/// │ ├── readme.md
/// │ └─┬ deep/
/// │   └── note.md
/// └─┬ media/
///   └── song.mp3
/// ```
async fn create_test_tree() -> (Tree, MemoryBackend) {
    let (tree, backend) = memory::new_tree().await.unwrap();
    backend.put_file("/a.txt", b"alpha").await.unwrap();
    backend.put_file("/docs/readme.md", b"# docs").await.unwrap();
    backend.put_file("/docs/deep/note.md", b"deep note").await.unwrap();
    backend.put_file("/media/song.mp3", b"ID3").await.unwrap();
    (tree, backend)
}

/// Every key reachable from the root by following `child_paths`
fn reachable(tree: &Tree) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut pending = vec![tree.root_path().to_string()];
    while let Some(path) = pending.pop() {
        let node = tree.get(&path).unwrap();
        pending.extend(node.child_paths().iter().cloned());
        assert!(seen.insert(path), "visited twice");
    }
    seen
}

/// The registry holds exactly the nodes reachable from the root
fn assert_consistent(tree: &Tree) {
    let registered: BTreeSet<String> = tree.paths().into_iter().map(String::from).collect();
    assert_eq!(registered, reachable(tree));
}
