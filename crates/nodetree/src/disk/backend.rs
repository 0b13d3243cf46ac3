// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::backend::{Backend, Probe, ReadStream};
use crate::error::{Error, Result};
use crate::node::NodeKind;
use crate::path;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diagnostics::*;
use futures::future::BoxFuture;
use std::io::SeekFrom;
use std::path::{MAIN_SEPARATOR, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// The local filesystem. Keys are host paths.
///
/// Symbolic links are leaves: a link is never listed through, so a scan or
/// a recursive delete stays inside the tree's root.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskBackend;

impl DiskBackend {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn mtime(meta: &std::fs::Metadata) -> DateTime<Utc> {
    meta.modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Children of a directory go first, then the directory itself
fn remove_tree(target: PathBuf) -> BoxFuture<'static, std::io::Result<()>> {
    Box::pin(async move {
        let meta = tokio::fs::symlink_metadata(&target).await?;
        if !meta.is_dir() {
            return tokio::fs::remove_file(&target).await;
        }
        let mut entries = tokio::fs::read_dir(&target).await?;
        while let Some(entry) = entries.next_entry().await? {
            remove_tree(entry.path()).await?;
        }
        tokio::fs::remove_dir(&target).await
    })
}

#[async_trait]
impl Backend for DiskBackend {
    fn delimiter(&self) -> char {
        MAIN_SEPARATOR
    }

    async fn probe(&self, target: &str) -> Result<Probe> {
        match tokio::fs::symlink_metadata(target).await {
            Ok(meta) if meta.is_dir() => Ok(Probe::Directory { mtime: mtime(&meta) }),
            Ok(meta) => Ok(Probe::File {
                size: meta.len(),
                mtime: mtime(&meta),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Probe::NotFound),
            Err(err) => Err(Error::from_io(target, err)),
        }
    }

    async fn list_children(&self, dir: &str) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| Error::from_io(dir, e))?;

        let mut files = Vec::new();
        let mut dirs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::from_io(dir, e))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            let key = path::join(dir, &name, MAIN_SEPARATOR);
            match tokio::fs::symlink_metadata(entry.path()).await {
                Ok(meta) if meta.is_dir() => dirs.push(key),
                Ok(_) => files.push(key),
                Err(err) => {
                    let message = err.to_string();
                    debug!("skipping unreadable entry {key}: {message}", key: key.as_str(), message: message);
                }
            }
        }
        files.sort();
        dirs.sort();
        files.extend(dirs);
        Ok(files)
    }

    async fn read_all(&self, file: &str) -> Result<Vec<u8>> {
        tokio::fs::read(file).await.map_err(|e| Error::from_io(file, e))
    }

    async fn read_range(&self, file: &str, offset: u64, len: usize) -> Result<Vec<u8>> {
        let mut handle = tokio::fs::File::open(file)
            .await
            .map_err(|e| Error::from_io(file, e))?;
        let _ = handle
            .seek(SeekFrom::Start(offset))
            .await
            .map_err(|e| Error::from_io(file, e))?;
        let mut buf = Vec::with_capacity(len.min(1 << 20));
        let _ = handle
            .take(len as u64)
            .read_to_end(&mut buf)
            .await
            .map_err(|e| Error::from_io(file, e))?;
        Ok(buf)
    }

    async fn open_read_stream(&self, file: &str) -> Result<ReadStream> {
        let handle = tokio::fs::File::open(file)
            .await
            .map_err(|e| Error::from_io(file, e))?;
        Ok(Box::pin(handle))
    }

    async fn write_all(&self, file: &str, bytes: &[u8]) -> Result<()> {
        tokio::fs::write(file, bytes)
            .await
            .map_err(|e| Error::from_io(file, e))
    }

    async fn create_entry(&self, target: &str, kind: NodeKind) -> Result<()> {
        let result = match kind {
            NodeKind::File => tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(target)
                .await
                .map(|_| ()),
            NodeKind::Directory => tokio::fs::create_dir(target).await,
        };
        result.map_err(|e| Error::from_io(target, e))
    }

    async fn remove_entry(&self, target: &str) -> Result<()> {
        match tokio::fs::symlink_metadata(target).await {
            Ok(_) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::not_found(target));
            }
            Err(err) => return Err(Error::from_io(target, err)),
        }
        remove_tree(PathBuf::from(target))
            .await
            .map_err(|e| Error::from_io(target, e))
    }
}
