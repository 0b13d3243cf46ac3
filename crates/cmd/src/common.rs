// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Result, anyhow};
use clap::ValueEnum;
use nodetree::{Node, SerializableNode, Tree};

/// How listings are rendered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Box-drawing tree
    #[default]
    Tree,
    /// Pretty-printed JSON snapshot
    Json,
}

/// Render a snapshot in the requested format
pub fn render_snapshot(snapshot: &SerializableNode, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Tree => Ok(snapshot.to_tree_node().to_string()),
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(snapshot)?)),
    }
}

/// Walk `relative` down from the root one name at a time, scanning each
/// directory on the way so the target is cached. Returns its full path.
pub async fn resolve(tree: &mut Tree, relative: &str) -> Result<String> {
    let mut current = tree.root_path().to_string();
    for name in relative.split(['/', '\\']).filter(|n| !n.is_empty() && *n != ".") {
        tree.scan(&current).await?;
        current = tree
            .child(&current, name)
            .map_err(|_| anyhow!("{relative}: no entry named '{name}' under {current}"))?
            .full_path()
            .to_string();
    }
    Ok(current)
}

/// One listing line: kind marker, size, full path
pub fn format_node_line(node: &Node) -> String {
    let marker = if node.is_dir() { 'd' } else { '-' };
    let size = if node.is_dir() {
        String::new()
    } else {
        format_file_size(node.length())
    };
    format!("{marker} {size:>8} {}\n", node.full_path())
}

/// Helper function to format file sizes
pub fn format_file_size(size: u64) -> String {
    if size >= 1024 * 1024 {
        format!("{:.1}MB", size as f64 / (1024.0 * 1024.0))
    } else if size >= 1024 {
        format!("{:.1}KB", size as f64 / 1024.0)
    } else {
        format!("{size}B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(12), "12B");
        assert_eq!(format_file_size(2048), "2.0KB");
        assert_eq!(format_file_size(3 * 1024 * 1024 + 512 * 1024), "3.5MB");
    }

    #[tokio::test]
    async fn test_resolve_scans_on_the_way_down() {
        let (mut tree, backend) = nodetree::memory::new_tree().await.unwrap();
        backend.put_file("/a/b/c.txt", b"c").await.unwrap();

        assert_eq!(resolve(&mut tree, "a/./b/c.txt").await.unwrap(), "/a/b/c.txt");
        assert_eq!(tree.len(), 4);
        assert_eq!(resolve(&mut tree, "").await.unwrap(), "/");
        assert!(resolve(&mut tree, "a/zzz").await.is_err());
    }
}
