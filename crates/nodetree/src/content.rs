// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! File content access. Every call validates the node against the backend
//! first, so a stale node fails with a drift error instead of reading
//! whatever now lives at its path.

use crate::backend::ReadStream;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::tree::Tree;
use diagnostics::*;

impl Tree {
    async fn checked_file(&mut self, path: &str) -> Result<Node> {
        let node = if self.backend.is_live() {
            self.validate(path).await?
        } else {
            self.get(path)?.clone()
        };
        if !node.is_file() {
            return Err(Error::not_a_file(node.full_path()));
        }
        Ok(node)
    }

    pub async fn get_bytes(&mut self, path: &str) -> Result<Vec<u8>> {
        let node = self.checked_file(path).await?;
        self.backend.read_all(node.full_path()).await
    }

    /// Read at most `len` bytes starting at `offset`. Short at end of file.
    pub async fn get_bytes_range(&mut self, path: &str, offset: u64, len: usize) -> Result<Vec<u8>> {
        let node = self.checked_file(path).await?;
        self.backend.read_range(node.full_path(), offset, len).await
    }

    pub async fn get_read_stream(&mut self, path: &str) -> Result<ReadStream> {
        let node = self.checked_file(path).await?;
        self.backend.open_read_stream(node.full_path()).await
    }

    /// Replace the content of the file at `path`
    pub async fn write_bytes(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let node = self.checked_file(path).await?;
        let path = node.full_path();
        self.backend.write_all(path, bytes).await?;

        let probe = self.backend.probe(path).await?;
        if let Some(cached) = self.registry.get_mut(path) {
            cached.refresh(&probe);
        }
        debug!("wrote {len} bytes to {path}", len: bytes.len(), path: path);
        Ok(())
    }
}
