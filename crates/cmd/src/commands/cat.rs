// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::resolve;
use anyhow::Result;
use diagnostics::*;
use std::path::Path;

/// Read one file below `root`, addressed relative to it.
///
/// Bytes that are not UTF-8 are replaced.
pub async fn cat_command<F>(root: &Path, relative: &str, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    debug!("cat_command called with path {relative}", relative: relative);

    let mut tree = nodetree::disk::open_tree(root).await?;
    let target = resolve(&mut tree, relative).await?;
    let bytes = tree.get_bytes(&target).await?;
    handler(&String::from_utf8_lossy(&bytes));
    tree.close().await?;
    Ok(())
}
