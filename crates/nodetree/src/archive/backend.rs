// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::ArchiveOptions;
use super::build::{detect_delimiter, zip_time};
use crate::backend::{Backend, Probe, ReadStream};
use crate::error::{Error, Result};
use crate::node::NodeKind;
use crate::path;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diagnostics::*;
use std::collections::BTreeMap;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub(crate) trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

type Archive = ZipArchive<Box<dyn ReadSeek + Send>>;

/// Where the bytes of an entry currently live
#[derive(Debug, Clone)]
enum Source {
    /// Entry `n` of the open archive
    Archived(usize),
    /// Written or created since the archive was opened
    Staged(Vec<u8>),
    /// Created since the archive was opened
    NewDirectory,
    /// Implied by a deeper entry name, no entry of its own
    Implied,
}

#[derive(Debug, Clone)]
pub(crate) struct ArchiveEntry {
    pub(crate) kind: NodeKind,
    pub(crate) size: u64,
    pub(crate) mtime: DateTime<Utc>,
    /// Name as stored in the archive
    raw_name: String,
    source: Source,
}

struct Inner {
    archive: Option<Archive>,
    entries: BTreeMap<String, ArchiveEntry>,
    /// Keys in archive order, implied directories placed before their first child
    order: Vec<String>,
    dirty: bool,
}

/// A zip archive opened for reading, or for update when not read-only.
///
/// The archive's structure is read once at open time. Changes made through
/// the tree are staged in memory and written back by `flush`, which
/// rewrites the whole archive next to the original and swaps it in.
pub struct ArchiveBackend {
    inner: Arc<Mutex<Inner>>,
    delimiter: char,
    location: Option<PathBuf>,
    read_only: bool,
}

impl std::fmt::Debug for ArchiveBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveBackend")
            .field("location", &self.location)
            .field("delimiter", &self.delimiter)
            .field("read_only", &self.read_only)
            .finish()
    }
}

fn lock(inner: &Mutex<Inner>) -> Result<MutexGuard<'_, Inner>> {
    inner
        .lock()
        .map_err(|_| Error::Other("archive state poisoned".to_string()))
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Other(format!("archive task failed: {e}")))?
}

/// Registry key for a stored name: empty segments are dropped, so
/// `/a//b.txt` and `a/b.txt` name the same entry
fn entry_key(name: &str, delimiter: char) -> String {
    let segments: Vec<&str> = name.split(delimiter).filter(|s| !s.is_empty()).collect();
    path::format_path(&segments.join(&delimiter.to_string()))
}

fn index_archive(archive: &mut Archive) -> Result<(char, BTreeMap<String, ArchiveEntry>, Vec<String>)> {
    let mut raw = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let file = archive.by_index_raw(i)?;
        let modified: Option<zip::DateTime> = file.last_modified().into();
        raw.push((
            i,
            file.name().to_string(),
            file.size(),
            modified.and_then(zip_time),
        ));
    }

    let names: Vec<&str> = raw.iter().map(|(_, name, _, _)| name.as_str()).collect();
    let delimiter = detect_delimiter(&names);

    let mut entries: BTreeMap<String, ArchiveEntry> = BTreeMap::new();
    let mut order = Vec::new();
    for (index, name, size, mtime) in raw {
        let is_dir = name.ends_with(path::DELIMITERS);
        let key = entry_key(&name, delimiter);
        if key.is_empty() {
            continue;
        }
        if let Some(existing) = entries.get_mut(&key) {
            // A directory entry stored after its first child
            if is_dir && matches!(existing.source, Source::Implied) {
                existing.source = Source::Archived(index);
                existing.raw_name = name;
                existing.mtime = mtime.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
            } else {
                warn!("skipping duplicate archive entry {name}", name: name);
            }
            continue;
        }

        imply_parents(&mut entries, &mut order, &key, delimiter);
        let kind = if is_dir {
            NodeKind::Directory
        } else {
            NodeKind::File
        };
        let _ = entries.insert(
            key.clone(),
            ArchiveEntry {
                kind,
                size: if is_dir { 0 } else { size },
                mtime: mtime.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
                raw_name: name,
                source: Source::Archived(index),
            },
        );
        order.push(key);
    }
    Ok((delimiter, entries, order))
}

fn imply_parents(
    entries: &mut BTreeMap<String, ArchiveEntry>,
    order: &mut Vec<String>,
    key: &str,
    delimiter: char,
) {
    let (parent, _) = path::split(key, delimiter);
    if parent.is_empty() || parent == key || entries.contains_key(&parent) {
        return;
    }
    imply_parents(entries, order, &parent, delimiter);
    let _ = entries.insert(
        parent.clone(),
        ArchiveEntry {
            kind: NodeKind::Directory,
            size: 0,
            mtime: DateTime::<Utc>::UNIX_EPOCH,
            raw_name: format!("{parent}{delimiter}"),
            source: Source::Implied,
        },
    );
    order.push(parent);
}

impl ArchiveBackend {
    /// Open the archive at `location`
    pub async fn open<P: AsRef<Path>>(location: P, options: ArchiveOptions) -> Result<Self> {
        let location = location.as_ref().to_path_buf();
        let path = location.clone();
        let (archive, delimiter, entries, order) = blocking(move || {
            if options.create_if_missing && !path.exists() {
                if options.read_only {
                    return Err(Error::read_only(path.to_string_lossy()));
                }
                let file = std::fs::File::create(&path).map_err(|e| Error::from_io(&path, e))?;
                let _ = ZipWriter::new(file).finish()?;
            }
            let file = std::fs::File::open(&path).map_err(|e| Error::from_io(&path, e))?;
            let reader: Box<dyn ReadSeek + Send> = Box::new(std::io::BufReader::new(file));
            let mut archive = ZipArchive::new(reader)?;
            let (delimiter, entries, order) = index_archive(&mut archive)?;
            Ok((archive, delimiter, entries, order))
        })
        .await?;

        info!(
            "opened archive {path} ({count} entries)",
            path: location.to_string_lossy().to_string(),
            count: entries.len()
        );
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                archive: Some(archive),
                entries,
                order,
                dirty: false,
            })),
            delimiter,
            location: Some(location),
            read_only: options.read_only,
        })
    }

    /// Open an archive held in memory. Always read-only.
    pub async fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let (archive, delimiter, entries, order) = blocking(move || {
            let reader: Box<dyn ReadSeek + Send> = Box::new(std::io::Cursor::new(bytes));
            let mut archive = ZipArchive::new(reader)?;
            let (delimiter, entries, order) = index_archive(&mut archive)?;
            Ok((archive, delimiter, entries, order))
        })
        .await?;

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                archive: Some(archive),
                entries,
                order,
                dirty: false,
            })),
            delimiter,
            location: None,
            read_only: true,
        })
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Entries in archive order, implied directories included
    pub(crate) fn entries(&self) -> Result<Vec<(String, ArchiveEntry)>> {
        let inner = lock(&self.inner)?;
        Ok(inner
            .order
            .iter()
            .filter_map(|k| inner.entries.get(k).map(|e| (k.clone(), e.clone())))
            .collect())
    }

    fn check_writable(&self, target: &str) -> Result<()> {
        if self.read_only {
            Err(Error::read_only(target))
        } else {
            Ok(())
        }
    }

    /// Write staged changes back to the archive file
    pub async fn flush(&self) -> Result<()> {
        let location = match (&self.location, self.read_only) {
            (Some(location), false) => location.clone(),
            _ => {
                let target = self
                    .location
                    .as_ref()
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_else(|| "<memory>".to_string());
                return Err(Error::read_only(target));
            }
        };
        let inner = self.inner.clone();

        let written = blocking(move || {
            let mut inner = lock(&inner)?;
            if !inner.dirty {
                return Ok(0);
            }
            let staging = PathBuf::from(format!("{}.tmp", location.to_string_lossy()));
            let file = std::fs::File::create(&staging).map_err(|e| Error::from_io(&staging, e))?;
            let mut writer = ZipWriter::new(file);
            let options = SimpleFileOptions::default();

            let Inner {
                archive,
                entries,
                order,
                ..
            } = &mut *inner;
            let mut written = 0;
            for key in order.iter() {
                let Some(entry) = entries.get_mut(key) else {
                    continue;
                };
                match &entry.source {
                    Source::Implied => continue,
                    Source::Archived(index) => {
                        let archive = archive
                            .as_mut()
                            .ok_or_else(|| Error::Other("archive is closed".to_string()))?;
                        let file = archive.by_index_raw(*index)?;
                        writer.raw_copy_file(file)?;
                    }
                    Source::Staged(bytes) => {
                        writer.start_file(entry.raw_name.as_str(), options)?;
                        writer.write_all(bytes)?;
                    }
                    Source::NewDirectory => {
                        writer.add_directory(entry.raw_name.as_str(), options)?;
                    }
                }
                entry.source = Source::Archived(written);
                written += 1;
            }
            let _ = writer.finish()?;

            *archive = None;
            std::fs::rename(&staging, &location).map_err(|e| Error::from_io(&location, e))?;
            let file = std::fs::File::open(&location).map_err(|e| Error::from_io(&location, e))?;
            let reader: Box<dyn ReadSeek + Send> = Box::new(std::io::BufReader::new(file));
            *archive = Some(ZipArchive::new(reader)?);
            inner.dirty = false;
            Ok(written)
        })
        .await?;

        if let Some(location) = &self.location {
            info!(
                "flushed archive {path} ({written} entries)",
                path: location.to_string_lossy().to_string(),
                written: written
            );
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for ArchiveBackend {
    fn delimiter(&self) -> char {
        self.delimiter
    }

    fn is_live(&self) -> bool {
        false
    }

    async fn probe(&self, target: &str) -> Result<Probe> {
        let key = path::format_path(target);
        if key.is_empty() {
            return Ok(Probe::Directory {
                mtime: DateTime::<Utc>::UNIX_EPOCH,
            });
        }
        let inner = lock(&self.inner)?;
        Ok(match inner.entries.get(&key) {
            None => Probe::NotFound,
            Some(e) if e.kind == NodeKind::Directory => Probe::Directory { mtime: e.mtime },
            Some(e) => Probe::File {
                size: e.size,
                mtime: e.mtime,
            },
        })
    }

    async fn list_children(&self, dir: &str) -> Result<Vec<String>> {
        let key = path::format_path(dir);
        let inner = lock(&self.inner)?;
        if !key.is_empty() && !inner.entries.contains_key(&key) {
            return Err(Error::not_found(key));
        }
        Ok(inner
            .order
            .iter()
            .filter(|k| path::split(k, self.delimiter).0 == key)
            .cloned()
            .collect())
    }

    async fn read_all(&self, file: &str) -> Result<Vec<u8>> {
        let key = path::format_path(file);
        let source = {
            let inner = lock(&self.inner)?;
            match inner.entries.get(&key) {
                None => return Err(Error::not_found(key)),
                Some(e) if e.kind == NodeKind::Directory => return Err(Error::not_a_file(key)),
                Some(e) => e.source.clone(),
            }
        };
        let index = match source {
            Source::Staged(bytes) => return Ok(bytes),
            Source::Archived(index) => index,
            Source::NewDirectory | Source::Implied => return Err(Error::not_a_file(key)),
        };

        let inner = self.inner.clone();
        blocking(move || {
            let mut inner = lock(&inner)?;
            let archive = inner
                .archive
                .as_mut()
                .ok_or_else(|| Error::Other("archive is closed".to_string()))?;
            let mut entry = archive.by_index(index)?;
            let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
            let _ = entry.read_to_end(&mut bytes)?;
            Ok(bytes)
        })
        .await
    }

    async fn read_range(&self, file: &str, _offset: u64, _len: usize) -> Result<Vec<u8>> {
        Err(Error::unsupported(format!(
            "ranged read of compressed archive entry {file}"
        )))
    }

    async fn open_read_stream(&self, file: &str) -> Result<ReadStream> {
        let bytes = self.read_all(file).await?;
        Ok(Box::pin(std::io::Cursor::new(bytes)))
    }

    async fn write_all(&self, file: &str, bytes: &[u8]) -> Result<()> {
        self.check_writable(file)?;
        let key = path::format_path(file);
        let mut inner = lock(&self.inner)?;
        let entry = match inner.entries.get_mut(&key) {
            None => return Err(Error::not_found(key)),
            Some(e) if e.kind == NodeKind::Directory => return Err(Error::not_a_file(key)),
            Some(e) => e,
        };
        entry.source = Source::Staged(bytes.to_vec());
        entry.size = bytes.len() as u64;
        entry.mtime = Utc::now();
        inner.dirty = true;
        Ok(())
    }

    async fn create_entry(&self, target: &str, kind: NodeKind) -> Result<()> {
        self.check_writable(target)?;
        let key = path::format_path(target);
        let (parent, _) = path::split(&key, self.delimiter);
        let mut inner = lock(&self.inner)?;
        if inner.entries.contains_key(&key) {
            return Err(Error::already_exists(key));
        }
        if !parent.is_empty() {
            match inner.entries.get(&parent) {
                Some(e) if e.kind == NodeKind::Directory => {}
                Some(_) => return Err(Error::not_a_directory(parent)),
                None => return Err(Error::not_found(parent)),
            }
        }
        let (raw_name, source) = match kind {
            NodeKind::File => (key.clone(), Source::Staged(Vec::new())),
            NodeKind::Directory => (format!("{key}{}", self.delimiter), Source::NewDirectory),
        };
        let _ = inner.entries.insert(
            key.clone(),
            ArchiveEntry {
                kind,
                size: 0,
                mtime: Utc::now(),
                raw_name,
                source,
            },
        );
        inner.order.push(key);
        inner.dirty = true;
        Ok(())
    }

    async fn remove_entry(&self, target: &str) -> Result<()> {
        self.check_writable(target)?;
        let key = path::format_path(target);
        let prefix = format!("{key}{}", self.delimiter);
        let mut inner = lock(&self.inner)?;
        if !inner.entries.contains_key(&key) {
            return Err(Error::not_found(key));
        }
        inner
            .entries
            .retain(|k, _| k != &key && !k.starts_with(&prefix));
        inner.order.retain(|k| k != &key && !k.starts_with(&prefix));
        inner.dirty = true;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let dirty = lock(&self.inner)?.dirty;
        if dirty && !self.read_only {
            self.flush().await?;
        }
        lock(&self.inner)?.archive = None;
        Ok(())
    }
}
