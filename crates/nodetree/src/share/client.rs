// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The protocol seam for network shares.
//!
//! A `ShareClient` speaks to a server through locators. Directory locators
//! end with `/`; a client may fail to describe a directory addressed
//! without it, which `ShareBackend::probe` works around.

use crate::backend::ReadStream;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use url::Url;

/// What a server reports about one locator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareStat {
    pub is_dir: bool,
    pub size: u64,
    pub mtime: DateTime<Utc>,
}

#[async_trait]
pub trait ShareClient: Send + Sync {
    /// `None` when nothing answers at `url`
    async fn stat(&self, url: &Url) -> Result<Option<ShareStat>>;

    /// Child names of a directory locator; directories carry a trailing `/`
    async fn list(&self, url: &Url) -> Result<Vec<String>>;

    async fn read(&self, url: &Url) -> Result<Vec<u8>>;

    async fn read_range(&self, url: &Url, offset: u64, len: usize) -> Result<Vec<u8>>;

    async fn open_read(&self, url: &Url) -> Result<ReadStream>;

    async fn write(&self, url: &Url, bytes: &[u8]) -> Result<()>;

    async fn create_file(&self, url: &Url) -> Result<()>;

    async fn mkdir(&self, url: &Url) -> Result<()>;

    /// Remove a file, or a directory with everything in it
    async fn delete(&self, url: &Url) -> Result<()>;

    /// Share names offered by a server locator, as the server reports them
    async fn list_shares(&self, server: &Url) -> Result<Vec<String>>;
}

/// A client for a server whose shares are mounted under one local
/// directory, one subdirectory per share
#[derive(Debug, Clone)]
pub struct MountedShareClient {
    mount_root: PathBuf,
}

impl MountedShareClient {
    pub fn new<P: Into<PathBuf>>(mount_root: P) -> Self {
        Self {
            mount_root: mount_root.into(),
        }
    }

    fn local_path(&self, url: &Url) -> Result<PathBuf> {
        let decoded = Url::parse(&format!("file://{}", url.path()))?
            .to_file_path()
            .map_err(|()| Error::invalid_path(url.path()))?;
        let relative = decoded
            .strip_prefix("/")
            .map_err(|_| Error::invalid_path(url.path()))?;
        Ok(self.mount_root.join(relative))
    }
}

fn stat_of(meta: &std::fs::Metadata) -> ShareStat {
    ShareStat {
        is_dir: meta.is_dir(),
        size: if meta.is_dir() { 0 } else { meta.len() },
        mtime: meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
    }
}

#[async_trait]
impl ShareClient for MountedShareClient {
    async fn stat(&self, url: &Url) -> Result<Option<ShareStat>> {
        let local = self.local_path(url)?;
        match tokio::fs::metadata(&local).await {
            Ok(meta) => Ok(Some(stat_of(&meta))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::from_io(&local, err)),
        }
    }

    async fn list(&self, url: &Url) -> Result<Vec<String>> {
        if !url.path().ends_with('/') {
            return Err(Error::not_a_directory(url.path()));
        }
        let local = self.local_path(url)?;
        let mut entries = tokio::fs::read_dir(&local)
            .await
            .map_err(|e| Error::from_io(&local, e))?;
        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::from_io(&local, e))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = tokio::fs::metadata(entry.path())
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            names.push(if is_dir { format!("{name}/") } else { name });
        }
        names.sort();
        Ok(names)
    }

    async fn read(&self, url: &Url) -> Result<Vec<u8>> {
        let local = self.local_path(url)?;
        tokio::fs::read(&local)
            .await
            .map_err(|e| Error::from_io(&local, e))
    }

    async fn read_range(&self, url: &Url, offset: u64, len: usize) -> Result<Vec<u8>> {
        use tokio::io::{AsyncReadExt, AsyncSeekExt};

        let local = self.local_path(url)?;
        let mut file = tokio::fs::File::open(&local)
            .await
            .map_err(|e| Error::from_io(&local, e))?;
        let _ = file
            .seek(std::io::SeekFrom::Start(offset))
            .await
            .map_err(|e| Error::from_io(&local, e))?;
        let mut buf = Vec::new();
        let _ = file
            .take(len as u64)
            .read_to_end(&mut buf)
            .await
            .map_err(|e| Error::from_io(&local, e))?;
        Ok(buf)
    }

    async fn open_read(&self, url: &Url) -> Result<ReadStream> {
        let local = self.local_path(url)?;
        let file = tokio::fs::File::open(&local)
            .await
            .map_err(|e| Error::from_io(&local, e))?;
        Ok(Box::pin(file))
    }

    async fn write(&self, url: &Url, bytes: &[u8]) -> Result<()> {
        let local = self.local_path(url)?;
        tokio::fs::write(&local, bytes)
            .await
            .map_err(|e| Error::from_io(&local, e))
    }

    async fn create_file(&self, url: &Url) -> Result<()> {
        let local = self.local_path(url)?;
        let _ = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&local)
            .await
            .map_err(|e| Error::from_io(&local, e))?;
        Ok(())
    }

    async fn mkdir(&self, url: &Url) -> Result<()> {
        let local = self.local_path(url)?;
        tokio::fs::create_dir(&local)
            .await
            .map_err(|e| Error::from_io(&local, e))
    }

    async fn delete(&self, url: &Url) -> Result<()> {
        let local = self.local_path(url)?;
        let meta = tokio::fs::metadata(&local)
            .await
            .map_err(|e| Error::from_io(&local, e))?;
        let result = if meta.is_dir() {
            tokio::fs::remove_dir_all(&local).await
        } else {
            tokio::fs::remove_file(&local).await
        };
        result.map_err(|e| Error::from_io(&local, e))
    }

    async fn list_shares(&self, _server: &Url) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.mount_root)
            .await
            .map_err(|e| Error::from_io(&self.mount_root, e))?;
        let mut shares = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::from_io(&self.mount_root, e))?
        {
            if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                shares.push(format!("{}/", entry.file_name().to_string_lossy()));
            }
        }
        shares.sort();
        Ok(shares)
    }
}
