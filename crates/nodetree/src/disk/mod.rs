// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Local filesystem trees.
//!
//! Keys are host paths joined with the platform separator. Nothing is held
//! open between calls: every operation goes back to `tokio::fs`.

mod backend;


pub use backend::DiskBackend;

use crate::error::{Error, Result};
use crate::tree::Tree;
use std::path::Path;
use std::sync::Arc;

/// Open a tree rooted at a host directory and scan its direct children.
/// A root given as a symbolic link is resolved first.
pub async fn open_tree<P: AsRef<Path>>(root: P) -> Result<Tree> {
    let root = resolve_root(root.as_ref()).await?;
    let mut tree = Tree::new(Arc::new(DiskBackend::new()), &root).await?;
    let root = tree.root_path().to_string();
    tree.scan(&root).await?;
    Ok(tree)
}

async fn resolve_root(root: &Path) -> Result<String> {
    let is_link = tokio::fs::symlink_metadata(root)
        .await
        .is_ok_and(|meta| meta.file_type().is_symlink());
    if !is_link {
        return Ok(root.to_string_lossy().to_string());
    }
    let target = tokio::fs::canonicalize(root)
        .await
        .map_err(|e| Error::from_io(root, e))?;
    Ok(target.to_string_lossy().to_string())
}

/// Open a tree rooted at a host directory and scan all of it
pub async fn open_tree_recursive<P: AsRef<Path>>(root: P) -> Result<Tree> {
    let mut tree = open_tree(root).await?;
    tree.scan_recursive().await?;
    Ok(tree)
}
