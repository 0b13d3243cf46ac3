// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::backend::Probe;
use crate::error::{Error, Result};
use crate::node::{Node, NodeKind};
use crate::path;
use crate::tree::Tree;
use diagnostics::*;
use futures::future::BoxFuture;

impl Tree {
    /// Create a file or directory named `name` under the directory at
    /// `parent`, in the backend and in the cache
    pub async fn create_child(
        &mut self,
        parent: &str,
        name: &str,
        kind: NodeKind,
    ) -> Result<&Node> {
        let parent_node = self.get(parent)?;
        if !parent_node.is_dir() {
            return Err(Error::not_a_directory(parent_node.full_path()));
        }
        let parent = parent_node.full_path().to_string();

        let delimiter = self.delimiter();
        if name.is_empty() || name.contains(path::DELIMITERS) || name.contains(delimiter) {
            return Err(Error::invalid_path(name));
        }

        let child_path = path::join(&parent, name, delimiter);
        if self.registry.contains_key(&child_path) {
            return Err(Error::already_exists(child_path));
        }
        if self.backend.probe(&child_path).await? != Probe::NotFound {
            return Err(Error::already_exists(child_path));
        }

        self.backend.create_entry(&child_path, kind).await?;
        let probe = self.backend.probe(&child_path).await?;
        let node = Node::from_probe(&child_path, delimiter, probe)?;
        self.attach(&parent, node, None)?;

        debug!("created {kind} {path}", kind: kind.to_string(), path: child_path.as_str());
        self.get(&child_path)
    }

    /// Delete the entity at `path` from the backend, then drop it from the
    /// cache. Only cached children are removed first: scan the subtree
    /// beforehand for a full delete.
    pub fn delete<'a>(&'a mut self, path: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let node = self.get(path)?;
            if node.is_root() {
                return Err(Error::unsupported("cannot delete the root node"));
            }
            let path = node.full_path().to_string();
            let children = node.child_paths().to_vec();

            for child in &children {
                if self.registry.contains_key(child) {
                    self.delete(child).await?;
                }
            }

            if self.backend.probe(&path).await? != Probe::NotFound {
                self.backend.remove_entry(&path).await?;
            }
            if self.backend.probe(&path).await? != Probe::NotFound {
                return Err(Error::delete_failed(path));
            }

            self.dispose_node(&path)?;
            debug!("deleted {path}", path: path.as_str());
            Ok(())
        })
    }
}
