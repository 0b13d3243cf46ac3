// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::backend::Probe;
use crate::error::{Error, Result};
use crate::path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type of node (file or directory)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Directory,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::File => write!(f, "File"),
            NodeKind::Directory => write!(f, "Directory"),
        }
    }
}

/// One cached tree entry.
///
/// A node never holds references to its parent or children. Relations are
/// stored as registry keys and resolved through the owning `Tree`, so the
/// full path is the node's identity and never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    full_path: String,
    parent_path: String,
    name: String,
    extension: String,
    kind: NodeKind,
    update_time: DateTime<Utc>,
    length: u64,
    is_root: bool,
    pub(crate) child_paths: Vec<String>,
}

/// Notifications emitted as nodes join and leave the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEvent {
    ChildAdded { parent: String, child: String },
    Removed { path: String, parent: String },
}

impl Node {
    /// Build a node for `full_path` under `delimiter`
    pub fn new(
        full_path: &str,
        delimiter: char,
        kind: NodeKind,
        length: u64,
        update_time: DateTime<Utc>,
    ) -> Self {
        let full_path = path::format_path(full_path);
        let (parent_path, name) = path::split(&full_path, delimiter);
        let (extension, length) = match kind {
            NodeKind::File => (path::extension(&name), length),
            NodeKind::Directory => (String::new(), 0),
        };
        Self {
            full_path,
            parent_path,
            name,
            extension,
            kind,
            update_time,
            length,
            is_root: false,
            child_paths: Vec::new(),
        }
    }

    /// Build a node from live backend state
    pub fn from_probe(full_path: &str, delimiter: char, probe: Probe) -> Result<Self> {
        let kind = probe
            .kind()
            .ok_or_else(|| Error::not_found(path::format_path(full_path)))?;
        Ok(Self::new(
            full_path,
            delimiter,
            kind,
            probe.size(),
            probe.mtime(),
        ))
    }

    /// Turn this node into a tree root: roots have no parent key
    #[must_use]
    pub(crate) fn into_root(mut self) -> Self {
        self.parent_path = String::new();
        self.is_root = true;
        self
    }

    /// A directory root with no backend counterpart (archives)
    #[must_use]
    pub fn virtual_root() -> Self {
        Self {
            full_path: String::new(),
            parent_path: String::new(),
            name: String::new(),
            extension: String::new(),
            kind: NodeKind::Directory,
            update_time: DateTime::<Utc>::UNIX_EPOCH,
            length: 0,
            is_root: true,
            child_paths: Vec::new(),
        }
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn parent_path(&self) -> &str {
        &self.parent_path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn update_time(&self) -> DateTime<Utc> {
        self.update_time
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Child keys in insertion order. Only populated by scan or create,
    /// and may hold entries the backend has since dropped.
    pub fn child_paths(&self) -> &[String] {
        &self.child_paths
    }

    /// Refresh size and timestamp from a probe that agrees on kind
    pub(crate) fn refresh(&mut self, probe: &Probe) {
        if self.kind == NodeKind::File {
            self.length = probe.size();
        }
        self.update_time = probe.mtime();
    }
}
