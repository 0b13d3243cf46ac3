// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::backend::ReadStream;
use crate::error::Error;
use crate::node::NodeKind;
use async_trait::async_trait;
use tempfile::TempDir;
use url::Url;

/// A mount root holding one share, `public`
fn create_test_mount() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    let share = dir.path().join("public");
    std::fs::create_dir_all(share.join("docs")).unwrap();
    std::fs::write(share.join("readme.md"), b"# public").unwrap();
    std::fs::write(share.join("docs/a.txt"), b"alpha").unwrap();
    std::fs::write(share.join("track #1.mp3"), b"ID3").unwrap();
    dir
}

fn locator() -> ShareLocator {
    ShareLocator::new("nas", ShareCredentials::user("guest", "guest")).unwrap()
}

/// Answers nothing for a directory addressed without a trailing `/`
struct SlashOnlyClient(MountedShareClient);

#[async_trait]
impl ShareClient for SlashOnlyClient {
    async fn stat(&self, url: &Url) -> crate::Result<Option<ShareStat>> {
        let stat = self.0.stat(url).await?;
        match stat {
            Some(s) if s.is_dir && !url.path().ends_with('/') => Ok(None),
            other => Ok(other),
        }
    }
    async fn list(&self, url: &Url) -> crate::Result<Vec<String>> {
        self.0.list(url).await
    }
    async fn read(&self, url: &Url) -> crate::Result<Vec<u8>> {
        self.0.read(url).await
    }
    async fn read_range(&self, url: &Url, offset: u64, len: usize) -> crate::Result<Vec<u8>> {
        self.0.read_range(url, offset, len).await
    }
    async fn open_read(&self, url: &Url) -> crate::Result<ReadStream> {
        self.0.open_read(url).await
    }
    async fn write(&self, url: &Url, bytes: &[u8]) -> crate::Result<()> {
        self.0.write(url, bytes).await
    }
    async fn create_file(&self, url: &Url) -> crate::Result<()> {
        self.0.create_file(url).await
    }
    async fn mkdir(&self, url: &Url) -> crate::Result<()> {
        self.0.mkdir(url).await
    }
    async fn delete(&self, url: &Url) -> crate::Result<()> {
        self.0.delete(url).await
    }
    async fn list_shares(&self, server: &Url) -> crate::Result<Vec<String>> {
        self.0.list_shares(server).await
    }
}

#[tokio::test]
async fn test_open_share_tree() {
    let mount = create_test_mount();
    let client = Arc::new(MountedShareClient::new(mount.path()));
    let mut tree = open_tree_recursive(client, locator(), "public").await.unwrap();

    assert_eq!(tree.delimiter(), '/');
    let names: Vec<&str> = tree.children("public").unwrap().iter().map(|n| n.name()).collect();
    assert_eq!(names, vec!["docs", "readme.md", "track #1.mp3"]);
    assert_eq!(tree.get_bytes("public/docs/a.txt").await.unwrap(), b"alpha");
    assert_eq!(tree.get_bytes_range("public/docs/a.txt", 1, 3).await.unwrap(), b"lph");
    // Reserved characters survive the trip through the locator
    assert_eq!(tree.get_bytes("public/track #1.mp3").await.unwrap(), b"ID3");
}

#[tokio::test]
async fn test_directory_answers_only_with_trailing_slash() {
    let mount = create_test_mount();
    let client = Arc::new(SlashOnlyClient(MountedShareClient::new(mount.path())));

    let tree = open_tree_recursive(client.clone(), locator(), "public").await.unwrap();
    assert!(tree.get("public").unwrap().is_dir());
    assert!(tree.get("public/docs").unwrap().is_dir());
    assert!(tree.exists("public/docs/a.txt"));

    assert!(exists(client.clone(), locator(), "public/docs").await.unwrap());
    assert!(!exists(client, locator(), "public/nothing").await.unwrap());
}

#[tokio::test]
async fn test_create_write_delete_on_share() {
    let mount = create_test_mount();
    let client = Arc::new(MountedShareClient::new(mount.path()));
    let mut tree = open_tree(client, locator(), "public").await.unwrap();

    tree.create_child("public", "inbox", NodeKind::Directory)
        .await
        .unwrap();
    tree.create_child("public/inbox", "note.txt", NodeKind::File)
        .await
        .unwrap();
    tree.write_bytes("public/inbox/note.txt", b"remember").await.unwrap();
    assert_eq!(
        std::fs::read(mount.path().join("public/inbox/note.txt")).unwrap(),
        b"remember"
    );

    tree.delete("public/inbox").await.unwrap();
    assert!(!mount.path().join("public/inbox").exists());
    assert!(!tree.exists("public/inbox/note.txt"));
}

#[tokio::test]
async fn test_share_drift() {
    let mount = create_test_mount();
    let client = Arc::new(MountedShareClient::new(mount.path()));
    let mut tree = open_tree_recursive(client, locator(), "public").await.unwrap();

    std::fs::remove_file(mount.path().join("public/readme.md")).unwrap();
    let result = tree.get_bytes("public/readme.md").await;
    assert!(matches!(result, Err(Error::EntityGone(_))));
    assert!(!tree.exists("public/readme.md"));
}

#[tokio::test]
async fn test_mounted_list_needs_directory_form() {
    let mount = create_test_mount();
    let client = MountedShareClient::new(mount.path());
    let locator = locator();

    let plain = client.list(&locator.url("public").unwrap()).await;
    assert!(matches!(plain, Err(Error::NotADirectory(_))));

    let listed = client.list(&locator.dir_url("public").unwrap()).await.unwrap();
    assert_eq!(listed, vec!["docs/", "readme.md", "track #1.mp3"]);
}
