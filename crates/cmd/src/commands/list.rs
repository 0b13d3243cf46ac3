// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::{OutputFormat, render_snapshot};
use anyhow::Result;
use diagnostics::*;
use std::path::Path;

/// List a directory tree on disk.
///
/// Only the root's direct children are shown unless `recursive` is set.
pub async fn list_command<F>(
    root: &Path,
    recursive: bool,
    format: OutputFormat,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let root_display = root.display().to_string();
    debug!("list_command called with root {root}", root: root_display.as_str());

    let mut tree = nodetree::disk::open_tree(root).await?;
    if recursive {
        tree.scan_recursive().await?;
    }
    let snapshot = tree.serializable(tree.root_path())?;
    handler(&render_snapshot(&snapshot, format)?);
    tree.close().await?;
    Ok(())
}
