// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::{OutputFormat, render_snapshot};
use anyhow::Result;
use diagnostics::*;
use nodetree::archive::{self, ArchiveOptions};
use std::path::Path;

/// List every entry of a zip archive, read-only
pub async fn zip_list_command<F>(archive_path: &Path, format: OutputFormat, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let display = archive_path.display().to_string();
    debug!("zip_list_command called with archive {archive}", archive: display.as_str());

    let tree = archive::open_tree(archive_path, ArchiveOptions::default()).await?;
    let snapshot = tree.serializable(tree.root_path())?;
    handler(&render_snapshot(&snapshot, format)?);
    tree.close().await?;
    Ok(())
}
