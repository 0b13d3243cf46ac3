// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Zip archive trees.
//!
//! The whole structure is read when the archive is opened, under a virtual
//! root with no entry of its own. Scanning is a no-op afterwards: the tree
//! changes only through `create_child`, `write_bytes` and `delete`, and
//! those changes reach the file when the tree is closed.

mod backend;
mod build;


pub use backend::ArchiveBackend;
pub use build::detect_delimiter;

use crate::error::Result;
use crate::tree::Tree;
use std::path::Path;
use std::sync::Arc;

/// How an archive file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Refuse every mutation with `Error::ReadOnly`
    pub read_only: bool,
    /// Start from an empty archive when the file does not exist
    pub create_if_missing: bool,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            read_only: true,
            create_if_missing: false,
        }
    }
}

impl ArchiveOptions {
    /// Open for update, creating the archive when missing
    #[must_use]
    pub fn writable() -> Self {
        Self {
            read_only: false,
            create_if_missing: true,
        }
    }
}

/// Build a tree over an already opened archive
pub fn tree_for(backend: Arc<ArchiveBackend>) -> Result<Tree> {
    build::build_tree(backend)
}

pub async fn open_tree<P: AsRef<Path>>(location: P, options: ArchiveOptions) -> Result<Tree> {
    let backend = ArchiveBackend::open(location, options).await?;
    tree_for(Arc::new(backend))
}

/// Open an archive from memory; the tree is always read-only
pub async fn open_tree_from_bytes(bytes: Vec<u8>) -> Result<Tree> {
    let backend = ArchiveBackend::from_bytes(bytes).await?;
    tree_for(Arc::new(backend))
}
