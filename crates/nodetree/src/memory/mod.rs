// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory backend.
//!
//! Used for tests and as the smallest example of a backend. Helpers such as
//! `put_file` and `remove` change the store behind the tree's back, the way
//! another process changes a real disk, and `deny_listing`/`pin` inject the
//! failures a real store can produce.

use crate::backend::{Backend, Probe, ReadStream};
use crate::error::{Error, Result};
use crate::node::NodeKind;
use crate::path;
use crate::tree::Tree;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

const DELIMITER: char = '/';

#[derive(Debug, Clone)]
struct Entry {
    kind: NodeKind,
    data: Vec<u8>,
    mtime: DateTime<Utc>,
}

impl Entry {
    fn new(kind: NodeKind, data: Vec<u8>) -> Self {
        Self {
            kind,
            data,
            mtime: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    entries: BTreeMap<String, Entry>,
    denied: HashSet<String>,
    pinned: HashSet<String>,
}

impl State {
    fn children_of(&self, parent: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|k| k.as_str() != parent && path::split(k, DELIMITER).0 == parent)
            .cloned()
            .collect()
    }

    fn ensure_dirs(&mut self, dir: &str) -> Result<()> {
        if dir.is_empty() {
            return Ok(());
        }
        match self.entries.get(dir) {
            Some(entry) if entry.kind == NodeKind::Directory => Ok(()),
            Some(_) => Err(Error::not_a_directory(dir)),
            None => {
                let (parent, _) = path::split(dir, DELIMITER);
                if parent != dir {
                    self.ensure_dirs(&parent)?;
                }
                self.entries
                    .insert(dir.to_string(), Entry::new(NodeKind::Directory, Vec::new()));
                Ok(())
            }
        }
    }

    fn remove_subtree(&mut self, target: &str) {
        let prefix = format!("{target}{DELIMITER}");
        self.entries
            .retain(|k, _| k != target && !k.starts_with(&prefix));
    }

    fn file(&self, key: &str) -> Result<&Entry> {
        match self.entries.get(key) {
            Some(entry) if entry.kind == NodeKind::File => Ok(entry),
            Some(_) => Err(Error::not_a_file(key)),
            None => Err(Error::not_found(key)),
        }
    }
}

/// A `/`-delimited store held entirely in memory
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// An empty store holding only the directory `/`
    #[must_use]
    pub fn new() -> Self {
        let mut state = State::default();
        state.entries.insert(
            DELIMITER.to_string(),
            Entry::new(NodeKind::Directory, Vec::new()),
        );
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Write a file, creating missing parent directories
    pub async fn put_file(&self, file: &str, bytes: &[u8]) -> Result<()> {
        let key = path::format_path(file);
        let mut state = self.state.lock().await;
        if let Some(existing) = state.entries.get(&key) {
            if existing.kind == NodeKind::Directory {
                return Err(Error::not_a_file(key));
            }
        }
        state.ensure_dirs(&path::split(&key, DELIMITER).0)?;
        state
            .entries
            .insert(key, Entry::new(NodeKind::File, bytes.to_vec()));
        Ok(())
    }

    /// Create a directory and its missing parents
    pub async fn put_dir(&self, dir: &str) -> Result<()> {
        let key = path::format_path(dir);
        self.state.lock().await.ensure_dirs(&key)
    }

    /// Remove an entry and everything below it, bypassing any pin
    pub async fn remove(&self, target: &str) {
        let key = path::format_path(target);
        self.state.lock().await.remove_subtree(&key);
    }

    /// Make `list_children` on `dir` fail with `PermissionDenied`
    pub async fn deny_listing(&self, dir: &str) {
        let _ = self.state.lock().await.denied.insert(path::format_path(dir));
    }

    /// Make `remove_entry` on `target` report success without removing it
    pub async fn pin(&self, target: &str) {
        let _ = self.state.lock().await.pinned.insert(path::format_path(target));
    }

    /// Every stored key, sorted
    pub async fn keys(&self) -> Vec<String> {
        self.state.lock().await.entries.keys().cloned().collect()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn delimiter(&self) -> char {
        DELIMITER
    }

    async fn probe(&self, target: &str) -> Result<Probe> {
        let state = self.state.lock().await;
        Ok(match state.entries.get(&path::format_path(target)) {
            None => Probe::NotFound,
            Some(e) if e.kind == NodeKind::Directory => Probe::Directory { mtime: e.mtime },
            Some(e) => Probe::File {
                size: e.data.len() as u64,
                mtime: e.mtime,
            },
        })
    }

    async fn list_children(&self, dir: &str) -> Result<Vec<String>> {
        let key = path::format_path(dir);
        let state = self.state.lock().await;
        if state.denied.contains(&key) {
            return Err(Error::permission_denied(key));
        }
        match state.entries.get(&key) {
            Some(e) if e.kind == NodeKind::Directory => Ok(state.children_of(&key)),
            Some(_) => Err(Error::not_a_directory(key)),
            None => Err(Error::not_found(key)),
        }
    }

    async fn read_all(&self, file: &str) -> Result<Vec<u8>> {
        let state = self.state.lock().await;
        Ok(state.file(&path::format_path(file))?.data.clone())
    }

    async fn read_range(&self, file: &str, offset: u64, len: usize) -> Result<Vec<u8>> {
        let state = self.state.lock().await;
        let data = &state.file(&path::format_path(file))?.data;
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(data.len());
        let end = start.saturating_add(len).min(data.len());
        Ok(data[start..end].to_vec())
    }

    async fn open_read_stream(&self, file: &str) -> Result<ReadStream> {
        let bytes = self.read_all(file).await?;
        Ok(Box::pin(std::io::Cursor::new(bytes)))
    }

    async fn write_all(&self, file: &str, bytes: &[u8]) -> Result<()> {
        let key = path::format_path(file);
        let mut state = self.state.lock().await;
        state.file(&key)?;
        state
            .entries
            .insert(key, Entry::new(NodeKind::File, bytes.to_vec()));
        Ok(())
    }

    async fn create_entry(&self, target: &str, kind: NodeKind) -> Result<()> {
        let key = path::format_path(target);
        let (parent, _) = path::split(&key, DELIMITER);
        let mut state = self.state.lock().await;
        if state.entries.contains_key(&key) {
            return Err(Error::already_exists(key));
        }
        match state.entries.get(&parent) {
            Some(e) if e.kind == NodeKind::Directory => {}
            Some(_) => return Err(Error::not_a_directory(parent)),
            None => return Err(Error::not_found(parent)),
        }
        state.entries.insert(key, Entry::new(kind, Vec::new()));
        Ok(())
    }

    async fn remove_entry(&self, target: &str) -> Result<()> {
        let key = path::format_path(target);
        let mut state = self.state.lock().await;
        if !state.entries.contains_key(&key) {
            return Err(Error::not_found(key));
        }
        if state.pinned.contains(&key) {
            return Ok(());
        }
        state.remove_subtree(&key);
        Ok(())
    }
}

/// A tree rooted at `/` of a fresh memory store, plus a handle on the store
pub async fn new_tree() -> Result<(Tree, MemoryBackend)> {
    let backend = MemoryBackend::new();
    let tree = Tree::new(Arc::new(backend.clone()), "/").await?;
    Ok((tree, backend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok, block_on};

    #[test]
    fn test_store_helpers() {
        let backend = MemoryBackend::new();
        block_on(async {
            assert_ok!(backend.put_file("/a/b/c.txt", b"abc").await);
            assert_eq!(backend.keys().await, vec!["/", "/a", "/a/b", "/a/b/c.txt"]);
            assert_err!(backend.put_file("/a/b", b"x").await);
            assert_err!(backend.put_file("/a/b/c.txt/d", b"x").await);

            assert_eq!(backend.read_range("/a/b/c.txt", 1, 10).await.unwrap(), b"bc");
            assert_eq!(backend.read_range("/a/b/c.txt", 9, 1).await.unwrap(), b"");
            assert!(matches!(
                backend.read_all("/a").await,
                Err(Error::NotAFile(_))
            ));
        });
    }

    #[test]
    fn test_injected_failures() {
        let backend = MemoryBackend::new();
        block_on(async {
            assert_ok!(backend.put_dir("/locked").await);
            backend.deny_listing("/locked").await;
            assert!(matches!(
                backend.list_children("/locked").await,
                Err(Error::PermissionDenied(_))
            ));

            backend.pin("/locked").await;
            assert_ok!(backend.remove_entry("/locked").await);
            assert_eq!(backend.probe("/locked").await.unwrap().kind(), Some(NodeKind::Directory));

            backend.remove("/locked").await;
            assert_eq!(backend.probe("/locked").await.unwrap(), Probe::NotFound);
        });
    }
}
