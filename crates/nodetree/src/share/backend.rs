// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::client::{ShareClient, ShareStat};
use super::locator::ShareLocator;
use crate::backend::{Backend, Probe, ReadStream};
use crate::error::Result;
use crate::node::NodeKind;
use crate::path;
use async_trait::async_trait;
use diagnostics::*;
use std::sync::Arc;

const DELIMITER: char = '/';

/// A network share reached through a `ShareClient`
pub struct ShareBackend {
    client: Arc<dyn ShareClient>,
    locator: ShareLocator,
}

impl std::fmt::Debug for ShareBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareBackend")
            .field("server", &self.locator.server())
            .finish()
    }
}

impl ShareBackend {
    pub fn new(client: Arc<dyn ShareClient>, locator: ShareLocator) -> Self {
        Self { client, locator }
    }

    pub fn locator(&self) -> &ShareLocator {
        &self.locator
    }

    /// Stat `key`, retrying in directory form when the plain form gets no
    /// answer. Servers commonly only describe a directory addressed with a
    /// trailing delimiter.
    async fn stat(&self, key: &str) -> Result<Option<ShareStat>> {
        if let Some(stat) = self.client.stat(&self.locator.url(key)?).await? {
            return Ok(Some(stat));
        }
        let retried = self.client.stat(&self.locator.dir_url(key)?).await?;
        if retried.is_some() {
            debug!("{key} answered only in directory form", key: key);
        }
        Ok(retried)
    }
}

#[async_trait]
impl Backend for ShareBackend {
    fn delimiter(&self) -> char {
        DELIMITER
    }

    async fn probe(&self, target: &str) -> Result<Probe> {
        Ok(match self.stat(&path::format_path(target)).await? {
            None => Probe::NotFound,
            Some(stat) if stat.is_dir => Probe::Directory { mtime: stat.mtime },
            Some(stat) => Probe::File {
                size: stat.size,
                mtime: stat.mtime,
            },
        })
    }

    async fn list_children(&self, dir: &str) -> Result<Vec<String>> {
        let dir = path::format_path(dir);
        let names = self.client.list(&self.locator.dir_url(&dir)?).await?;
        Ok(names
            .iter()
            .map(|name| name.trim_end_matches(DELIMITER))
            .filter(|name| !name.is_empty())
            .map(|name| path::join(&dir, name, DELIMITER))
            .collect())
    }

    async fn read_all(&self, file: &str) -> Result<Vec<u8>> {
        self.client.read(&self.locator.url(file)?).await
    }

    async fn read_range(&self, file: &str, offset: u64, len: usize) -> Result<Vec<u8>> {
        self.client
            .read_range(&self.locator.url(file)?, offset, len)
            .await
    }

    async fn open_read_stream(&self, file: &str) -> Result<ReadStream> {
        self.client.open_read(&self.locator.url(file)?).await
    }

    async fn write_all(&self, file: &str, bytes: &[u8]) -> Result<()> {
        self.client.write(&self.locator.url(file)?, bytes).await
    }

    async fn create_entry(&self, target: &str, kind: NodeKind) -> Result<()> {
        match kind {
            NodeKind::File => self.client.create_file(&self.locator.url(target)?).await,
            NodeKind::Directory => self.client.mkdir(&self.locator.dir_url(target)?).await,
        }
    }

    async fn remove_entry(&self, target: &str) -> Result<()> {
        let url = match self.probe(target).await? {
            Probe::Directory { .. } => self.locator.dir_url(target)?,
            _ => self.locator.url(target)?,
        };
        self.client.delete(&url).await
    }
}
