// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Scan and validation.
//!
//! Scanning is shallow: `scan` reconciles the cached children of one
//! directory against the backend and never descends. Recursive scans walk
//! the cached tree one directory at a time.

use crate::backend::Probe;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::path;
use crate::tree::Tree;
use diagnostics::*;
use futures::future::BoxFuture;
use std::collections::HashSet;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

impl Tree {
    /// Reconcile the cached children of `path` against the backend
    pub async fn scan(&mut self, path: &str) -> Result<()> {
        let path = self.get(path)?.full_path().to_string();

        if !self.backend.is_live() {
            return Ok(());
        }

        let node = self.validate(&path).await?;
        if node.is_file() {
            return Ok(());
        }

        let live = match self.backend.list_children(&path).await {
            Ok(live) => live,
            Err(err @ (Error::PermissionDenied(_) | Error::Io(_))) => {
                let message = err.to_string();
                warn!("cannot enumerate {path}: {message}", path: path.as_str(), message: message);
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        let live: Vec<String> = live.iter().map(|p| path::format_path(p)).collect();
        let stale: Vec<String> = {
            let live_set: HashSet<&str> = live.iter().map(String::as_str).collect();
            self.get(&path)?
                .child_paths()
                .iter()
                .filter(|c| !live_set.contains(c.as_str()))
                .cloned()
                .collect()
        };
        let mut removed = 0;
        for child in &stale {
            removed += self.dispose_node(child)?;
        }

        let delimiter = self.delimiter();
        let mut added = 0;
        for child in live {
            if self.registry.contains_key(&child) {
                continue;
            }
            let probe = self.backend.probe(&child).await?;
            if probe == Probe::NotFound {
                // Removed between listing and probing
                continue;
            }
            let node = Node::from_probe(&child, delimiter, probe)?;
            self.attach(&path, node, None)?;
            added += 1;
        }

        debug!(
            "scanned {path}: {added} added, {removed} removed",
            path: path.as_str(),
            added: added,
            removed: removed
        );
        Ok(())
    }

    /// Compare the cached node at `path` with the live entity and heal the
    /// registry on drift. Returns a copy of the refreshed node.
    pub(crate) async fn validate(&mut self, path: &str) -> Result<Node> {
        let cached = self.get(path)?;
        let path = cached.full_path().to_string();
        let kind = cached.kind();
        let is_root = cached.is_root();
        let parent = cached.parent_path().to_string();

        let probe = self.backend.probe(&path).await?;
        match probe.kind() {
            Some(live) if live == kind => {
                let node = self
                    .registry
                    .get_mut(&path)
                    .ok_or_else(|| Error::not_found(path.as_str()))?;
                node.refresh(&probe);
                Ok(node.clone())
            }
            None if is_root => Err(Error::root_lost(path)),
            None => {
                self.dispose_node(&path)?;
                debug!("{path} is gone from the backend", path: path.as_str());
                Err(Error::entity_gone(path))
            }
            Some(_) if is_root => Err(Error::root_lost(path)),
            Some(_) => {
                self.dispose_node(&path)?;
                let replacement = Node::from_probe(&path, self.delimiter(), probe)?;
                self.attach(&parent, replacement, None)?;
                if let Err(err) = self.scan_boxed(path.clone()).await {
                    let message = err.to_string();
                    warn!("scan of replaced {path} failed: {message}", path: path.as_str(), message: message);
                }
                debug!("{path} changed kind and was rebuilt", path: path.as_str());
                Err(Error::entity_replaced(path))
            }
        }
    }

    fn scan_boxed(&mut self, path: String) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move { self.scan(&path).await })
    }

    /// Scan the whole tree, one directory at a time
    pub async fn scan_recursive(&mut self) -> Result<()> {
        let root = self.root_path.clone();
        self.scan_subtree(&root).await
    }

    /// Scan `path` and every directory below it
    pub async fn scan_subtree(&mut self, path: &str) -> Result<()> {
        self.scan_recursive_with_cancel_from(path, &CancellationToken::new())
            .await
    }

    /// Like `scan_recursive`, stopping with `Error::Cancelled` at the next
    /// directory boundary once `cancel` fires
    pub async fn scan_recursive_with_cancel(&mut self, cancel: &CancellationToken) -> Result<()> {
        let root = self.root_path.clone();
        self.scan_recursive_with_cancel_from(&root, cancel).await
    }

    pub async fn scan_recursive_with_cancel_from(
        &mut self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let path = self.get(path)?.full_path().to_string();
        self.scan_recursive_from(path.clone(), cancel.clone()).await?;
        info!("recursive scan of {path} complete: {count} nodes cached", path: path.as_str(), count: self.len());
        Ok(())
    }

    fn scan_recursive_from(
        &mut self,
        path: String,
        cancel: CancellationToken,
    ) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            tokio::task::yield_now().await;

            match self.scan_boxed(path.clone()).await {
                Ok(()) => {}
                Err(err)
                    if err.is_drift()
                        || matches!(err, Error::PermissionDenied(_) | Error::Io(_)) =>
                {
                    if !self.exists(&path) {
                        debug!("skipping vanished branch {path}", path: path.as_str());
                        return Ok(());
                    }
                }
                Err(err) => return Err(err),
            }

            let node = self.get(&path)?;
            if node.is_file() {
                return Ok(());
            }
            let children: Vec<String> = node.child_paths().to_vec();
            for child in children {
                let is_dir = match self.registry.get(&child) {
                    Some(node) => node.is_dir(),
                    None => continue,
                };
                if is_dir {
                    self.scan_recursive_from(child, cancel.clone()).await?;
                }
            }
            Ok(())
        })
    }

    /// Run the recursive scan on a tokio worker. The tree travels with the
    /// task and is handed back with the outcome.
    pub fn spawn_scan_recursive(self) -> JoinHandle<(Tree, Result<()>)> {
        self.spawn_scan_recursive_with_cancel(CancellationToken::new())
    }

    pub fn spawn_scan_recursive_with_cancel(
        mut self,
        cancel: CancellationToken,
    ) -> JoinHandle<(Tree, Result<()>)> {
        tokio::spawn(async move {
            let result = self.scan_recursive_with_cancel(&cancel).await;
            (self, result)
        })
    }
}
