// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Network share trees.
//!
//! Keys are `/`-joined paths below the server, starting with the share name
//! (`media/photos/2024`). How a key becomes a request is the business of
//! the `ShareLocator` and the `ShareClient`.

mod backend;
mod client;
mod locator;

#[cfg(test)]
mod tests;

pub use backend::ShareBackend;
pub use client::{MountedShareClient, ShareClient, ShareStat};
pub use locator::{ShareCredentials, ShareLocator};

use crate::backend::{Backend, Probe};
use crate::error::Result;
use crate::tree::Tree;
use std::sync::Arc;

/// Open a tree rooted at `root` on a share and scan its direct children
pub async fn open_tree(
    client: Arc<dyn ShareClient>,
    locator: ShareLocator,
    root: &str,
) -> Result<Tree> {
    let backend = ShareBackend::new(client, locator);
    let mut tree = Tree::new(Arc::new(backend), root).await?;
    let root = tree.root_path().to_string();
    tree.scan(&root).await?;
    Ok(tree)
}

/// Open a tree rooted at `root` on a share and scan all of it
pub async fn open_tree_recursive(
    client: Arc<dyn ShareClient>,
    locator: ShareLocator,
    root: &str,
) -> Result<Tree> {
    let mut tree = open_tree(client, locator, root).await?;
    tree.scan_recursive().await?;
    Ok(tree)
}

/// Whether anything answers at `key`, without building a tree
pub async fn exists(client: Arc<dyn ShareClient>, locator: ShareLocator, key: &str) -> Result<bool> {
    let backend = ShareBackend::new(client, locator);
    Ok(backend.probe(key).await? != Probe::NotFound)
}
