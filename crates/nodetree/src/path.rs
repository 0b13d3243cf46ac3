// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Path strings used as registry keys.
//!
//! Registry keys are plain strings rather than `PathBuf` because a tree may
//! describe a backend whose delimiter is not the host's (archives written on
//! another platform, shares that always use `/`).

/// Characters trimmed from the end of every key
pub const DELIMITERS: [char; 2] = ['\\', '/'];

/// Strips trailing delimiters. A path made only of delimiters keeps its
/// first character so that a filesystem root stays addressable.
#[must_use]
pub fn format_path(path: &str) -> String {
    let trimmed = path.trim_end_matches(DELIMITERS);
    if trimmed.is_empty() {
        path.chars().next().map(String::from).unwrap_or_default()
    } else {
        trimmed.to_string()
    }
}

/// Joins a child name onto a parent key with the backend's delimiter
#[must_use]
pub fn join(parent: &str, name: &str, delimiter: char) -> String {
    if parent.is_empty() {
        format_path(name)
    } else if parent.ends_with(delimiter) {
        format_path(&format!("{parent}{name}"))
    } else {
        format_path(&format!("{parent}{delimiter}{name}"))
    }
}

/// Splits a key into (parent key, name). The parent of a top-level name is
/// the empty string; the parent of `/x` is `/`.
#[must_use]
pub fn split(path: &str, delimiter: char) -> (String, String) {
    let path = format_path(path);
    match path.rsplit_once(delimiter) {
        Some((parent, name)) if parent.is_empty() => (delimiter.to_string(), name.to_string()),
        Some((parent, name)) => (format_path(parent), name.to_string()),
        None => (String::new(), path),
    }
}

/// Extracts the final component of a key
#[must_use]
pub fn basename(path: &str, delimiter: char) -> String {
    split(path, delimiter).1
}

/// File extension without the leading dot, empty if the name has none
#[must_use]
pub fn extension(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_string())
        .unwrap_or_default()
}
