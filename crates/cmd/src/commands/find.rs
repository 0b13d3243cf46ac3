// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::format_node_line;
use anyhow::{Result, anyhow};
use diagnostics::*;
use std::path::Path;

/// Search a directory tree on disk for paths containing `needle`.
///
/// Without `all`, reports the first match, preferring shallow entries.
pub async fn find_command<F>(root: &Path, needle: &str, all: bool, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    debug!("find_command called with needle {needle}", needle: needle);

    let tree = nodetree::disk::open_tree_recursive(root).await?;
    if all {
        for node in tree.find_all(needle)? {
            handler(&format_node_line(node));
        }
    } else {
        let node = tree
            .find(needle)?
            .ok_or_else(|| anyhow!("nothing below {} matches '{needle}'", root.display()))?;
        handler(&format_node_line(node));
    }
    tree.close().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("deep/er")).unwrap();
        std::fs::write(dir.path().join("deep/er/report.csv"), b"a,b").unwrap();
        std::fs::write(dir.path().join("report.csv"), b"a,b,c").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_find_first_and_all() {
        let dir = create_test_dir();

        let mut output = String::new();
        find_command(dir.path(), "report", false, |s| output.push_str(s))
            .await
            .unwrap();
        assert_eq!(output.lines().count(), 1);
        assert!(output.starts_with("-       5B "));

        let mut output = String::new();
        find_command(dir.path(), ".csv", true, |s| output.push_str(s))
            .await
            .unwrap();
        assert_eq!(output.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_find_without_match() {
        let dir = create_test_dir();
        assert!(find_command(dir.path(), "zzz", false, |_| {}).await.is_err());

        let mut output = String::new();
        find_command(dir.path(), "zzz", true, |s| output.push_str(s))
            .await
            .unwrap();
        assert!(output.is_empty());
    }
}
