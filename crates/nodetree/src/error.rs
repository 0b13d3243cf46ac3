// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors that can occur in tree operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more paths are absent from the registry
    #[error("Node not found: [{}]", .0.join(", "))]
    NotFound(Vec<String>),

    /// The backend no longer has an entity at the node's path
    #[error("Node entity deleted: {0}")]
    EntityGone(String),

    /// The backend entity changed kind; the node was rebuilt and must be refetched
    #[error("Node entity type changed: {0}")]
    EntityReplaced(String),

    #[error("Lost root node: {0}")]
    RootLost(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    #[error("Child already attached: {0}")]
    DuplicateChild(String),

    #[error("Invalid relationship: parent '{parent}', child '{child}'")]
    InvalidRelationship { parent: String, child: String },

    #[error("Delete failure: {0}")]
    DeleteFailed(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Read only: {0}")]
    ReadOnly(String),

    #[error("Scan cancelled")]
    Cancelled,

    #[error("Registry corrupt: {0}")]
    RegistryCorrupt(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Locator error: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn not_found<S: Into<String>>(path: S) -> Self {
        Error::NotFound(vec![path.into()])
    }

    pub fn entity_gone<S: Into<String>>(path: S) -> Self {
        Error::EntityGone(path.into())
    }

    pub fn entity_replaced<S: Into<String>>(path: S) -> Self {
        Error::EntityReplaced(path.into())
    }

    pub fn root_lost<S: Into<String>>(path: S) -> Self {
        Error::RootLost(path.into())
    }

    pub fn not_a_directory<S: Into<String>>(path: S) -> Self {
        Error::NotADirectory(path.into())
    }

    pub fn not_a_file<S: Into<String>>(path: S) -> Self {
        Error::NotAFile(path.into())
    }

    pub fn already_exists<S: Into<String>>(path: S) -> Self {
        Error::AlreadyExists(path.into())
    }

    pub fn duplicate_child<S: Into<String>>(path: S) -> Self {
        Error::DuplicateChild(path.into())
    }

    pub fn invalid_relationship<P: Into<String>, C: Into<String>>(parent: P, child: C) -> Self {
        Error::InvalidRelationship {
            parent: parent.into(),
            child: child.into(),
        }
    }

    pub fn delete_failed<S: Into<String>>(path: S) -> Self {
        Error::DeleteFailed(path.into())
    }

    pub fn unsupported<S: Into<String>>(what: S) -> Self {
        Error::Unsupported(what.into())
    }

    pub fn permission_denied<S: Into<String>>(path: S) -> Self {
        Error::PermissionDenied(path.into())
    }

    pub fn read_only<S: Into<String>>(path: S) -> Self {
        Error::ReadOnly(path.into())
    }

    pub fn registry_corrupt<S: Into<String>>(msg: S) -> Self {
        Error::RegistryCorrupt(msg.into())
    }

    pub fn invalid_path<S: Into<String>>(path: S) -> Self {
        Error::InvalidPath(path.into())
    }

    /// Translate an I/O failure on `path`, keeping the kinds the tree reacts to
    pub fn from_io<P: AsRef<Path>>(path: P, err: std::io::Error) -> Self {
        let path = path.as_ref().to_string_lossy().to_string();
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Error::PermissionDenied(path),
            std::io::ErrorKind::AlreadyExists => Error::AlreadyExists(path),
            _ => Error::Io(err),
        }
    }

    /// Programmer errors: structural invariants were violated and the tree
    /// can no longer be trusted. Never retry these.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::DuplicateChild(_) | Error::InvalidRelationship { .. } | Error::RegistryCorrupt(_)
        )
    }

    /// Live-backend drift. The registry has already healed; refetch by path.
    #[must_use]
    pub fn is_drift(&self) -> bool {
        matches!(self, Error::EntityGone(_) | Error::EntityReplaced(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_every_path() {
        let err = Error::NotFound(vec!["a/x".into(), "b/y".into()]);
        assert_eq!(err.to_string(), "Node not found: [a/x, b/y]");
    }

    #[test]
    fn test_classification() {
        assert!(Error::duplicate_child("x").is_fatal());
        assert!(Error::invalid_relationship("p", "c").is_fatal());
        assert!(!Error::entity_gone("x").is_fatal());
        assert!(Error::entity_replaced("x").is_drift());
        assert!(!Error::permission_denied("x").is_drift());
    }

    #[test]
    fn test_from_io_kinds() {
        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(
            Error::from_io("/p", denied),
            Error::PermissionDenied(p) if p == "/p"
        ));
        let other = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        assert!(matches!(Error::from_io("/p", other), Error::Io(_)));
    }
}
