// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Building a tree from an archive's entry list.

use super::ArchiveBackend;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::path;
use crate::tree::Tree;
use chrono::{DateTime, NaiveDate, Utc};
use diagnostics::*;
use std::sync::Arc;

/// Guess the delimiter an archive's entry names were written with.
///
/// Looks only at the longest name (the first one, on ties) and picks `/`
/// when splitting on it yields more parts than splitting on `\`. A name
/// with neither, or an empty archive, yields `\`. This is a best-effort
/// guess: a `/`-delimited archive whose longest name holds more literal
/// backslashes than slashes is read with the wrong delimiter.
#[must_use]
pub fn detect_delimiter(names: &[&str]) -> char {
    let mut longest: Option<&str> = None;
    for name in names {
        if longest.is_none_or(|l| name.chars().count() > l.chars().count()) {
            longest = Some(name);
        }
    }
    match longest {
        Some(name) if name.split('/').count() > name.split('\\').count() => '/',
        _ => '\\',
    }
}

/// Convert an archive timestamp, which carries no zone, as UTC
pub(crate) fn zip_time(t: zip::DateTime) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(i32::from(t.year()), u32::from(t.month()), u32::from(t.day()))?
        .and_hms_opt(u32::from(t.hour()), u32::from(t.minute()), u32::from(t.second()))
        .map(|naive| naive.and_utc())
}

/// Build a fully populated tree under a virtual root.
///
/// Archives may hold several top-level entries, so the root has no entry of
/// its own. Directories that only appear as a prefix of deeper names are
/// attached as ordinary directory nodes.
pub(crate) fn build_tree(backend: Arc<ArchiveBackend>) -> Result<Tree> {
    let entries = backend.entries()?;
    let delimiter = crate::backend::Backend::delimiter(backend.as_ref());
    let mut tree = Tree::with_root(backend, Node::virtual_root());

    for (key, entry) in entries {
        let (parent, _) = path::split(&key, delimiter);
        let node = Node::new(&key, delimiter, entry.kind, entry.size, entry.mtime);
        match tree.attach(&parent, node, None) {
            Ok(()) => {}
            // Nested under a file entry, or under something already skipped
            Err(Error::NotADirectory(_) | Error::NotFound(_)) => {
                warn!("skipping archive entry {key} with no directory parent", key: key);
            }
            Err(err) => return Err(err),
        }
    }

    debug!(
        "built archive tree: {count} nodes, delimiter {delimiter}",
        count: tree.len(),
        delimiter: delimiter.to_string()
    );
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter(&["a/b/c.txt", "a/"]), '/');
        assert_eq!(detect_delimiter(&["a\\b\\c.txt", "a\\"]), '\\');
        assert_eq!(detect_delimiter(&[]), '\\');
        // No delimiter at all in the longest name
        assert_eq!(detect_delimiter(&["a/b", "verylongname.txt"]), '\\');
        // First longest wins
        assert_eq!(detect_delimiter(&["x/y", "x\\y"]), '/');
    }

    #[test]
    fn test_zip_time() {
        let t = zip::DateTime::from_date_and_time(2024, 5, 17, 13, 45, 30).unwrap();
        let utc = zip_time(t).unwrap();
        assert_eq!(utc.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-05-17 13:45:30");
    }
}
