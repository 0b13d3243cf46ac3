// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Finding servers and shares to root share trees at.
//!
//! None of this touches a tree. Scans treat every failure as "nothing
//! there": an unreachable host or an unlistable server simply does not
//! appear in the results.

use crate::error::Result;
use crate::share::{ShareClient, ShareCredentials, ShareLocator};
use diagnostics::*;
use futures::StreamExt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::Instant;

/// Administrative share every server offers, never a useful root
const ADMIN_SHARE: &str = "IPC$";

/// Tuning for `scan_subnet`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubnetScanOptions {
    pub port: u16,
    /// Per-host connection attempt
    pub connect_timeout: Duration,
    /// Whole sweep; hosts still pending at the deadline are dropped
    pub scan_timeout: Duration,
    pub max_in_flight: usize,
}

impl Default for SubnetScanOptions {
    fn default() -> Self {
        Self {
            port: 445,
            connect_timeout: Duration::from_secs(3),
            scan_timeout: Duration::from_secs(10),
            max_in_flight: 100,
        }
    }
}

/// A share offered by a server
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Share {
    pub server: String,
    pub name: String,
}

/// Whether `addr` accepts a TCP connection on `port` within `timeout`
pub async fn probe_port(addr: IpAddr, port: u16, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect(SocketAddr::new(addr, port))).await,
        Ok(Ok(_))
    )
}

/// Hosts 1 to 254 of the /24 network `local` belongs to
#[must_use]
pub fn subnet_hosts(local: Ipv4Addr) -> Vec<Ipv4Addr> {
    let [a, b, c, _] = local.octets();
    (1..=254).map(|d| Ipv4Addr::new(a, b, c, d)).collect()
}

/// Sweep the /24 network around `local` for hosts answering on
/// `options.port`. The result is sorted.
pub async fn scan_subnet(local: Ipv4Addr, options: &SubnetScanOptions) -> Vec<Ipv4Addr> {
    let deadline = Instant::now() + options.scan_timeout;
    let port = options.port;
    let connect_timeout = options.connect_timeout;

    let mut probes = futures::stream::iter(subnet_hosts(local))
        .map(|host| async move {
            probe_port(IpAddr::V4(host), port, connect_timeout)
                .await
                .then_some(host)
        })
        .buffer_unordered(options.max_in_flight.max(1));

    let mut found = Vec::new();
    loop {
        match tokio::time::timeout_at(deadline, probes.next()).await {
            Ok(Some(Some(host))) => found.push(host),
            Ok(Some(None)) => {}
            Ok(None) => break,
            Err(_) => {
                warn!("subnet scan of {local} hit its deadline", local: local.to_string());
                break;
            }
        }
    }
    found.sort();
    debug!("subnet scan found {count} hosts on port {port}", count: found.len(), port: port);
    found
}

/// Shares offered by the server behind `locator`, without the
/// administrative share
pub async fn list_shares(client: &dyn ShareClient, locator: &ShareLocator) -> Result<Vec<Share>> {
    let names = client.list_shares(&locator.server_url()?).await?;
    Ok(names
        .iter()
        .map(|name| name.trim_end_matches('/'))
        .filter(|name| !name.is_empty() && *name != ADMIN_SHARE)
        .map(|name| Share {
            server: locator.server().to_string(),
            name: name.to_string(),
        })
        .collect())
}

/// Shares of every server in `servers`, skipping servers that cannot be
/// listed
pub async fn find_shares(
    client: &dyn ShareClient,
    servers: &[String],
    credentials: &ShareCredentials,
) -> Vec<Share> {
    let mut shares = Vec::new();
    for server in servers {
        let listed = match ShareLocator::new(server, credentials.clone()) {
            Ok(locator) => list_shares(client, &locator).await,
            Err(err) => Err(err),
        };
        match listed {
            Ok(found) => shares.extend(found),
            Err(err) => {
                let message = err.to_string();
                debug!("cannot list shares on {server}: {message}", server: server.as_str(), message: message);
            }
        }
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::share::MountedShareClient;
    use tempfile::TempDir;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_probe_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap().port();
        assert!(probe_port(IpAddr::V4(Ipv4Addr::LOCALHOST), open, Duration::from_secs(1)).await);

        drop(listener);
        assert!(!probe_port(IpAddr::V4(Ipv4Addr::LOCALHOST), open, Duration::from_secs(1)).await);
    }

    #[test]
    fn test_subnet_hosts() {
        let hosts = subnet_hosts(Ipv4Addr::new(192, 168, 1, 77));
        assert_eq!(hosts.len(), 254);
        assert_eq!(hosts[0], Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(hosts[253], Ipv4Addr::new(192, 168, 1, 254));
    }

    #[tokio::test]
    async fn test_scan_subnet_finds_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let options = SubnetScanOptions {
            port: listener.local_addr().unwrap().port(),
            connect_timeout: Duration::from_millis(300),
            scan_timeout: Duration::from_secs(5),
            max_in_flight: 32,
        };
        let found = scan_subnet(Ipv4Addr::new(127, 0, 0, 9), &options).await;
        assert!(found.contains(&Ipv4Addr::LOCALHOST));
    }

    #[tokio::test]
    async fn test_list_shares_skips_admin_share() {
        let mount = TempDir::new().unwrap();
        for share in ["IPC$", "media", "public"] {
            std::fs::create_dir(mount.path().join(share)).unwrap();
        }
        let client = MountedShareClient::new(mount.path());
        let locator = ShareLocator::new("nas", ShareCredentials::anonymous()).unwrap();

        let shares = list_shares(&client, &locator).await.unwrap();
        let names: Vec<&str> = shares.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["media", "public"]);
        assert!(shares.iter().all(|s| s.server == "nas"));

        let servers = vec!["nas".to_string(), "bad/name".to_string()];
        let all = find_shares(&client, &servers, &ShareCredentials::anonymous()).await;
        assert_eq!(all.len(), 2);
    }
}
