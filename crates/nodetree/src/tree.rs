// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Tree registry.
//!
//! The tree is the only structure holding live `Node` values. Every node
//! reaches the registry through a child-added notification from its parent
//! and leaves it through its own removal notification, so `paths()` always
//! matches the set of nodes reachable from the root through `child_paths`.
//!
//! Routing of notifications:
//! - `ChildAdded`: the registry inserts the child. From then on the child's
//!   own notifications are delivered to the registry as well, at any depth.
//! - `Removed`: delivered first to the parent, which prunes its
//!   `child_paths`, then to the registry, which drops the key.
//!
//! External observers receive both after the tree has applied them.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::node::{Node, NodeEvent};
use crate::path;
use diagnostics::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A cached tree over one backend
pub struct Tree {
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) root_path: String,
    pub(crate) registry: BTreeMap<String, Node>,
    subscribers: Vec<mpsc::UnboundedSender<NodeEvent>>,
}

impl Tree {
    /// Build a tree whose root is the live entity at `root`. Nothing below
    /// the root is cached until it is scanned.
    pub async fn new(backend: Arc<dyn Backend>, root: &str) -> Result<Self> {
        let root_path = path::format_path(root);
        let probe = backend.probe(&root_path).await?;
        let node = Node::from_probe(&root_path, backend.delimiter(), probe)?;
        info!("opened tree at {root}", root: root_path.as_str());
        Ok(Self::with_root(backend, node))
    }

    /// Build a tree around an explicit root node, which may have no live
    /// counterpart in the backend
    pub fn with_root(backend: Arc<dyn Backend>, root: Node) -> Self {
        let root = root.into_root();
        let root_path = root.full_path().to_string();
        Self {
            backend,
            registry: BTreeMap::from([(root_path.clone(), root)]),
            root_path,
            subscribers: Vec::new(),
        }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn delimiter(&self) -> char {
        self.backend.delimiter()
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    pub fn root(&self) -> Result<&Node> {
        self.get(&self.root_path)
    }

    /// Look up a cached node by full path
    pub fn get(&self, path: &str) -> Result<&Node> {
        self.registry
            .get(path)
            .or_else(|| self.registry.get(&path::format_path(path)))
            .ok_or_else(|| Error::not_found(path))
    }

    /// Look up several nodes, in input order. Fails naming every missing path.
    pub fn get_many<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<&Node>> {
        let mut found = Vec::with_capacity(paths.len());
        let mut missing = Vec::new();
        for p in paths {
            match self.get(p.as_ref()) {
                Ok(node) => found.push(node),
                Err(_) => missing.push(p.as_ref().to_string()),
            }
        }
        if missing.is_empty() {
            Ok(found)
        } else {
            Err(Error::NotFound(missing))
        }
    }

    pub fn exists(&self, path: &str) -> bool {
        self.get(path).is_ok()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.registry.keys().map(String::as_str).collect()
    }

    pub fn nodes(&self) -> Vec<&Node> {
        self.registry.values().collect()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Indexer by name under a directory
    pub fn child(&self, path: &str, name: &str) -> Result<&Node> {
        let parent = self.get(path)?;
        self.get(&path::join(parent.full_path(), name, self.delimiter()))
    }

    /// Indexer by name under the root
    pub fn index(&self, name: &str) -> Result<&Node> {
        self.child(&self.root_path, name)
    }

    /// Indexer by position in the cached child list
    pub fn child_at(&self, path: &str, index: usize) -> Result<&Node> {
        let parent = self.get(path)?;
        let child = parent.child_paths().get(index).ok_or_else(|| {
            Error::not_found(format!("{}[{index}]", parent.full_path()))
        })?;
        self.get(child)
    }

    pub fn children(&self, path: &str) -> Result<Vec<&Node>> {
        self.get_many(self.get(path)?.child_paths())
    }

    /// Parent of a cached node; `None` for the root
    pub fn parent(&self, path: &str) -> Option<&Node> {
        let node = self.get(path).ok()?;
        if node.is_root() {
            return None;
        }
        self.registry.get(node.parent_path())
    }

    /// Receive every notification the tree applies from now on
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<NodeEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Attach `child` under the directory at `parent`.
    ///
    /// `explicit_path` overrides the key composed from the parent and the
    /// child's name; either way it must equal the child's own full path.
    pub(crate) fn attach(
        &mut self,
        parent: &str,
        child: Node,
        explicit_path: Option<&str>,
    ) -> Result<()> {
        let delimiter = self.delimiter();
        let parent_node = self.get(parent)?;
        if !parent_node.is_dir() {
            return Err(Error::not_a_directory(parent));
        }
        let parent = parent_node.full_path().to_string();

        let child_path = match explicit_path {
            Some(p) => path::format_path(p),
            None => path::join(&parent, child.name(), delimiter),
        };

        if parent_node.child_paths.contains(&child_path) || self.registry.contains_key(&child_path)
        {
            return Err(Error::duplicate_child(child_path));
        }
        if child_path != child.full_path() || child.parent_path() != parent {
            return Err(Error::invalid_relationship(parent, child.full_path()));
        }

        if let Some(parent_node) = self.registry.get_mut(&parent) {
            parent_node.child_paths.push(child_path);
        }
        self.on_child_added(parent, child);
        Ok(())
    }

    fn on_child_added(&mut self, parent: String, child: Node) {
        let child_path = child.full_path().to_string();
        debug!("attached {child} under {parent}", child: child_path.as_str(), parent: parent.as_str());
        self.registry.insert(child_path.clone(), child);
        self.broadcast(NodeEvent::ChildAdded {
            parent,
            child: child_path,
        });
    }

    /// Detach a node and its cached subtree from the tree without touching
    /// the backend. Returns the number of registry entries removed.
    pub fn dispose(&mut self, path: &str) -> Result<usize> {
        let node = self.get(path)?;
        if node.is_root() {
            return Err(Error::unsupported(
                "the root node is disposed by closing the tree",
            ));
        }
        let path = node.full_path().to_string();
        self.dispose_node(&path)
    }

    /// Post-order disposal: children leave before their parent
    pub(crate) fn dispose_node(&mut self, path: &str) -> Result<usize> {
        let children = self
            .registry
            .get(path)
            .map(|n| n.child_paths.clone())
            .ok_or_else(|| Error::not_found(path))?;

        let mut removed = 0;
        for child in children {
            if self.registry.contains_key(&child) {
                removed += self.dispose_node(&child)?;
            }
        }

        let node = self
            .registry
            .get(path)
            .ok_or_else(|| Error::not_found(path))?;
        let parent = node.parent_path().to_string();
        let is_root = node.is_root();
        self.on_node_removed(path, &parent, is_root)?;
        Ok(removed + 1)
    }

    fn on_node_removed(&mut self, path: &str, parent: &str, is_root: bool) -> Result<()> {
        if !is_root {
            let parent_node = self
                .registry
                .get_mut(parent)
                .ok_or_else(|| Error::invalid_relationship(parent, path))?;
            let before = parent_node.child_paths.len();
            parent_node.child_paths.retain(|c| c != path);
            if parent_node.child_paths.len() == before {
                return Err(Error::invalid_relationship(parent, path));
            }
        }

        self.registry.remove(path);
        debug!("disposed {path}", path: path);
        self.broadcast(NodeEvent::Removed {
            path: path.to_string(),
            parent: parent.to_string(),
        });
        Ok(())
    }

    fn broadcast(&mut self, event: NodeEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Dispose the whole cached tree and release the backend
    pub async fn close(mut self) -> Result<()> {
        let root = self.root_path.clone();
        let removed = self.dispose_node(&root)?;
        if !self.registry.is_empty() {
            return Err(Error::registry_corrupt(format!(
                "{} entries left after disposing the root",
                self.registry.len()
            )));
        }
        info!("closed tree at {root} ({removed} nodes)", root: root.as_str(), removed: removed);
        self.backend.close().await
    }
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("root", &self.root_path)
            .field("nodes", &self.registry.len())
            .finish()
    }
}
