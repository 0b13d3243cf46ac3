// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Backend adapter trait.
//!
//! A backend answers questions about live state at a path and performs the
//! physical side of every mutation. It never sees nodes or the registry.

use crate::error::Result;
use crate::node::NodeKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::pin::Pin;
use tokio::io::AsyncRead;

/// Read-only byte stream over one entry
pub type ReadStream = Pin<Box<dyn AsyncRead + Send>>;

/// Live state of a path as the backend sees it right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    NotFound,
    File { size: u64, mtime: DateTime<Utc> },
    Directory { mtime: DateTime<Utc> },
}

impl Probe {
    #[must_use]
    pub fn kind(&self) -> Option<NodeKind> {
        match self {
            Probe::NotFound => None,
            Probe::File { .. } => Some(NodeKind::File),
            Probe::Directory { .. } => Some(NodeKind::Directory),
        }
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        match self {
            Probe::File { size, .. } => *size,
            _ => 0,
        }
    }

    #[must_use]
    pub fn mtime(&self) -> DateTime<Utc> {
        match self {
            Probe::File { mtime, .. } | Probe::Directory { mtime } => *mtime,
            Probe::NotFound => DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Delimiter used to compose child keys under this backend
    fn delimiter(&self) -> char;

    /// Whether the backend may change underneath the tree. Static backends
    /// (an open archive) skip validation and treat scan as a no-op.
    fn is_live(&self) -> bool {
        true
    }

    async fn probe(&self, path: &str) -> Result<Probe>;

    /// Full keys of the direct children of `path`
    async fn list_children(&self, path: &str) -> Result<Vec<String>>;

    async fn read_all(&self, path: &str) -> Result<Vec<u8>>;

    /// Reads at most `len` bytes starting at `offset`
    async fn read_range(&self, path: &str, offset: u64, len: usize) -> Result<Vec<u8>>;

    async fn open_read_stream(&self, path: &str) -> Result<ReadStream>;

    async fn write_all(&self, path: &str, bytes: &[u8]) -> Result<()>;

    async fn create_entry(&self, path: &str, kind: NodeKind) -> Result<()>;

    async fn remove_entry(&self, path: &str) -> Result<()>;

    /// Release held resources; called once when the tree is closed
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
