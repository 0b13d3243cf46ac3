// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::commands;
use cmd::common::OutputFormat;
use nodetree::discovery::SubnetScanOptions;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "ntree")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a directory tree
    Ls {
        /// Directory to open
        root: PathBuf,
        /// Scan every level instead of only the direct children
        #[arg(short, long)]
        recursive: bool,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Tree)]
        format: OutputFormat,
    },
    /// Search a directory tree for paths containing a string
    Find {
        root: PathBuf,
        needle: String,
        /// Report every match, depth first
        #[arg(short, long)]
        all: bool,
    },
    /// Print a file, addressed relative to a root
    Cat { root: PathBuf, path: String },
    /// Show the entries of a zip archive
    ZipLs {
        archive: PathBuf,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Tree)]
        format: OutputFormat,
    },
    /// List the shares of a server mounted under a local directory
    Shares {
        mount_root: PathBuf,
        #[arg(short, long, default_value = "localhost")]
        server: String,
    },
    /// Find hosts on the local /24 network with an open port
    Hosts {
        /// Any address on the network to sweep
        local: Ipv4Addr,
        #[arg(short, long, default_value_t = 445)]
        port: u16,
        /// Per-host connection timeout in milliseconds
        #[arg(long, default_value_t = 3000)]
        connect_timeout_ms: u64,
        /// Whole sweep timeout in milliseconds
        #[arg(long, default_value_t = 10000)]
        scan_timeout_ms: u64,
    },
}

#[allow(clippy::print_stdout)]
fn print_output(output: &str) {
    print!("{output}");
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();
    match cli.command {
        Commands::Ls {
            root,
            recursive,
            format,
        } => commands::list_command(&root, recursive, format, print_output).await,
        Commands::Find { root, needle, all } => {
            commands::find_command(&root, &needle, all, print_output).await
        }
        Commands::Cat { root, path } => commands::cat_command(&root, &path, print_output).await,
        Commands::ZipLs { archive, format } => {
            commands::zip_list_command(&archive, format, print_output).await
        }
        Commands::Shares { mount_root, server } => {
            commands::shares_command(&mount_root, &server, print_output).await
        }
        Commands::Hosts {
            local,
            port,
            connect_timeout_ms,
            scan_timeout_ms,
        } => {
            let options = SubnetScanOptions {
                port,
                connect_timeout: Duration::from_millis(connect_timeout_ms),
                scan_timeout: Duration::from_millis(scan_timeout_ms),
                ..SubnetScanOptions::default()
            };
            commands::hosts_command(local, options, print_output).await
        }
    }
}
