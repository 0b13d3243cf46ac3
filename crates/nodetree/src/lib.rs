// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Cached hierarchical trees over live storage.
//!
//! A [`Tree`] caches the structure of one backend (a local directory, a zip
//! archive, a network share, or memory) as a registry of [`Node`] values
//! keyed by full path. Directories are materialized on demand by
//! [`Tree::scan`]; every operation that touches the backend first checks
//! that the cached node still matches the live entity and repairs the
//! registry when it does not.
//!
//! ```no_run
//! # async fn demo() -> nodetree::Result<()> {
//! let mut tree = nodetree::disk::open_tree("/srv/data").await?;
//! tree.scan_recursive().await?;
//! let csv: Vec<String> = tree
//!     .find_all(".csv")?
//!     .iter()
//!     .map(|n| n.full_path().to_string())
//!     .collect();
//! for path in csv {
//!     let bytes = tree.get_bytes(&path).await?;
//!     # let _ = bytes;
//! }
//! tree.close().await?;
//! # Ok(())
//! # }
//! ```

mod content;
mod cursor;
mod mutate;
mod scan;
mod search;
mod serial;
mod tree;

pub mod archive;
pub mod backend;
pub mod discovery;
pub mod disk;
pub mod error;
pub mod memory;
pub mod node;
pub mod path;
pub mod share;
pub mod tree_format;

pub use backend::{Backend, Probe, ReadStream};
pub use cursor::NodeMut;
pub use error::{Error, Result};
pub use node::{Node, NodeEvent, NodeKind};
pub use serial::{SerializableNode, UPDATE_DATE_FORMAT};
pub use tree::Tree;

#[cfg(test)]
mod tests;
