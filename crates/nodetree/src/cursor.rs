// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::backend::ReadStream;
use crate::error::Result;
use crate::node::{Node, NodeKind};
use crate::serial::SerializableNode;
use crate::tree::Tree;

/// Operations on one node of a tree, addressed by path.
///
/// The cursor borrows the tree mutably and keeps only the path, so it stays
/// usable after drift heals the registry underneath it: a replaced node is
/// found again under the same path.
pub struct NodeMut<'t> {
    tree: &'t mut Tree,
    path: String,
}

impl Tree {
    /// Open a cursor on the cached node at `path`
    pub fn node_mut(&mut self, path: &str) -> Result<NodeMut<'_>> {
        let path = self.get(path)?.full_path().to_string();
        Ok(NodeMut { tree: self, path })
    }

    /// Open a cursor on the root
    pub fn root_mut(&mut self) -> NodeMut<'_> {
        let path = self.root_path.clone();
        NodeMut { tree: self, path }
    }
}

impl<'t> NodeMut<'t> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn node(&self) -> Result<&Node> {
        self.tree.get(&self.path)
    }

    pub fn children(&self) -> Result<Vec<&Node>> {
        self.tree.children(&self.path)
    }

    /// Move the cursor to the named child
    pub fn child(self, name: &str) -> Result<NodeMut<'t>> {
        let path = self.tree.child(&self.path, name)?.full_path().to_string();
        Ok(NodeMut {
            tree: self.tree,
            path,
        })
    }

    pub async fn scan(&mut self) -> Result<()> {
        self.tree.scan(&self.path).await
    }

    pub async fn scan_recursive(&mut self) -> Result<()> {
        self.tree.scan_subtree(&self.path).await
    }

    pub async fn create_child(&mut self, name: &str, kind: NodeKind) -> Result<NodeMut<'_>> {
        let path = self
            .tree
            .create_child(&self.path, name, kind)
            .await?
            .full_path()
            .to_string();
        Ok(NodeMut {
            tree: &mut *self.tree,
            path,
        })
    }

    pub async fn delete(self) -> Result<()> {
        self.tree.delete(&self.path).await
    }

    pub fn dispose(self) -> Result<usize> {
        self.tree.dispose(&self.path)
    }

    pub async fn get_bytes(&mut self) -> Result<Vec<u8>> {
        self.tree.get_bytes(&self.path).await
    }

    pub async fn get_bytes_range(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        self.tree.get_bytes_range(&self.path, offset, len).await
    }

    pub async fn get_read_stream(&mut self) -> Result<ReadStream> {
        self.tree.get_read_stream(&self.path).await
    }

    pub async fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.tree.write_bytes(&self.path, bytes).await
    }

    pub fn find(&self, needle: &str) -> Result<Option<&Node>> {
        self.tree.find_from(&self.path, needle)
    }

    pub fn find_all(&self, needle: &str) -> Result<Vec<&Node>> {
        self.tree.find_all_from(&self.path, needle)
    }

    pub fn serializable(&self) -> Result<SerializableNode> {
        self.tree.serializable(&self.path)
    }
}
