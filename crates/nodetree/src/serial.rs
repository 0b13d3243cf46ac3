// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Immutable snapshots of cached subtrees.

use crate::error::Result;
use crate::node::Node;
use crate::tree::Tree;
use crate::tree_format::TreeNode;
use serde::Serialize;

/// Timestamp layout used in snapshots
pub const UPDATE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A detached copy of one node and its cached descendants
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializableNode {
    pub name: String,
    pub extension: String,
    pub kind: String,
    pub full_path: String,
    pub update_date: String,
    pub is_root: bool,
    pub children: Vec<SerializableNode>,
}

impl SerializableNode {
    fn from_node(node: &Node, children: Vec<SerializableNode>) -> Self {
        Self {
            name: node.name().to_string(),
            extension: node.extension().to_string(),
            kind: node.kind().to_string(),
            full_path: node.full_path().to_string(),
            update_date: node.update_time().format(UPDATE_DATE_FORMAT).to_string(),
            is_root: node.is_root(),
            children,
        }
    }

    /// Number of entries in this snapshot, itself included
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }

    /// Render as a box-drawing tree labelled by name (full path for the root)
    #[must_use]
    pub fn to_tree_node(&self) -> TreeNode {
        let label = if self.is_root || self.name.is_empty() {
            if self.full_path.is_empty() {
                "/".to_string()
            } else {
                self.full_path.clone()
            }
        } else if self.kind == "Directory" {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        };
        TreeNode {
            label,
            children: self.children.iter().map(Self::to_tree_node).collect(),
        }
    }
}

impl Tree {
    /// Snapshot `path` and its cached descendants. No backend I/O.
    pub fn serializable(&self, path: &str) -> Result<SerializableNode> {
        let node = self.get(path)?;
        let children = self
            .children(node.full_path())?
            .into_iter()
            .map(|child| self.serializable(child.full_path()))
            .collect::<Result<Vec<_>>>()?;
        Ok(SerializableNode::from_node(node, children))
    }
}
