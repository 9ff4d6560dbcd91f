//! Error types shared by the engine crates.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised by single filesystem primitives.
///
/// Batch operations never return these directly; they are folded into
/// per-item outcomes by the caller.
#[derive(Debug, Error)]
pub enum FsError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Something already occupies the path.
    #[error("Already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// A directory cannot be copied or moved into itself.
    #[error("Cannot place {source_path} inside itself ({destination})")]
    SourceIsAncestor {
        source_path: PathBuf,
        destination: PathBuf,
    },

    /// A file name was rejected before touching the filesystem.
    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Moving to the trash failed.
    #[error("Could not move {path} to trash: {message}")]
    Trash { path: PathBuf, message: String },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FsError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an invalid name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// The path this error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::PermissionDenied { path }
            | Self::NotFound { path }
            | Self::AlreadyExists { path }
            | Self::Trash { path, .. }
            | Self::Io { path, .. } => Some(path),
            Self::SourceIsAncestor { source_path, .. } => Some(source_path),
            Self::InvalidName { .. } => None,
        }
    }
}

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}
