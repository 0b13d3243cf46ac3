// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use diagnostics::*;
use nodetree::discovery::{self, SubnetScanOptions};
use std::net::Ipv4Addr;

/// Sweep the /24 network around `local` for hosts answering on `port`,
/// one address per line
pub async fn hosts_command<F>(local: Ipv4Addr, options: SubnetScanOptions, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    info!("scanning the network of {local} on port {port}", local: local.to_string(), port: options.port);

    for host in discovery::scan_subnet(local, &options).await {
        handler(&format!("{host}\n"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_hosts_reports_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let options = SubnetScanOptions {
            port: listener.local_addr().unwrap().port(),
            connect_timeout: Duration::from_millis(300),
            scan_timeout: Duration::from_secs(5),
            ..SubnetScanOptions::default()
        };

        let mut output = String::new();
        hosts_command(Ipv4Addr::LOCALHOST, options, |s| output.push_str(s))
            .await
            .unwrap();
        assert!(output.lines().any(|l| l == "127.0.0.1"));
    }
}
