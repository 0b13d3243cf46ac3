// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use diagnostics::*;
use nodetree::discovery;
use nodetree::share::{MountedShareClient, ShareCredentials, ShareLocator};
use std::path::Path;

/// List the shares of a server whose shares are mounted under `mount_root`
pub async fn shares_command<F>(mount_root: &Path, server: &str, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    debug!("shares_command called with server {server}", server: server);

    let client = MountedShareClient::new(mount_root);
    let locator = ShareLocator::new(server, ShareCredentials::anonymous())?;
    for share in discovery::list_shares(&client, &locator).await? {
        handler(&format!("//{}/{}\n", share.server, share.name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_shares_skip_admin_share() {
        let mount = TempDir::new().unwrap();
        for share in ["IPC$", "music"] {
            std::fs::create_dir(mount.path().join(share)).unwrap();
        }
        std::fs::write(mount.path().join("stray.txt"), b"").unwrap();

        let mut output = String::new();
        shares_command(mount.path(), "nas", |s| output.push_str(s))
            .await
            .unwrap();
        assert_eq!(output, "//nas/music\n");
    }
}
