//! Per-item outcome types.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stagehand_core::FsError;

/// Why an item in a batch was left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The source no longer exists.
    SourceMissing,
    /// The target path is occupied and the operation does not rename.
    DestinationExists,
    /// A directory would end up inside itself.
    SourceIsAncestor,
    /// The filesystem refused access.
    PermissionDenied,
    /// Any other failure.
    Failed { message: String },
}

impl SkipReason {
    /// Classify a primitive's error for the item whose source is `source`.
    pub fn from_error(source: &Path, error: &FsError) -> Self {
        match error {
            FsError::NotFound { path } if path == source => Self::SourceMissing,
            FsError::AlreadyExists { .. } => Self::DestinationExists,
            FsError::SourceIsAncestor { .. } => Self::SourceIsAncestor,
            FsError::PermissionDenied { .. } => Self::PermissionDenied,
            other => Self::Failed {
                message: other.to_string(),
            },
        }
    }

    /// Create a generic failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceMissing => write!(f, "source no longer exists"),
            Self::DestinationExists => write!(f, "destination already exists"),
            Self::SourceIsAncestor => write!(f, "cannot place a directory inside itself"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::Failed { message } => write!(f, "{message}"),
        }
    }
}

/// The result of one item of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// The item was processed.
    Done {
        source: PathBuf,
        /// Where the item ended up, for operations that produce a path.
        destination: Option<PathBuf>,
        bytes: u64,
    },
    /// The item was left out; the batch continued.
    Skipped { path: PathBuf, reason: SkipReason },
}

impl ItemOutcome {
    /// A completed transfer.
    pub fn transferred(source: PathBuf, destination: PathBuf, bytes: u64) -> Self {
        Self::Done {
            source,
            destination: Some(destination),
            bytes,
        }
    }

    /// A completed operation with no destination (removal, creation).
    pub fn done(path: PathBuf) -> Self {
        Self::Done {
            source: path,
            destination: None,
            bytes: 0,
        }
    }

    /// A skipped item.
    pub fn skipped(path: PathBuf, reason: SkipReason) -> Self {
        Self::Skipped { path, reason }
    }

    /// Check if the item was processed.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. })
    }

    /// The `(source, destination)` pair of a completed transfer.
    pub fn pair(&self) -> Option<(&Path, &Path)> {
        match self {
            Self::Done {
                source,
                destination: Some(destination),
                ..
            } => Some((source, destination)),
            _ => None,
        }
    }

    /// Bytes moved or copied for this item.
    pub fn bytes(&self) -> u64 {
        match self {
            Self::Done { bytes, .. } => *bytes,
            Self::Skipped { .. } => 0,
        }
    }

    /// The error view of a skipped item.
    pub fn error(&self) -> Option<OperationError> {
        match self {
            Self::Skipped { path, reason } => {
                Some(OperationError::new(path.clone(), reason.to_string()))
            }
            Self::Done { .. } => None,
        }
    }
}

/// An error that occurred for one item of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationError {
    /// The path that caused the error.
    pub path: PathBuf,
    /// A human-readable error message.
    pub message: String,
}

impl OperationError {
    /// Create a new operation error.
    pub fn new(path: PathBuf, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}
