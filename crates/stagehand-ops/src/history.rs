//! Bounded undo/redo history of completed operations.
//!
//! History is bookkeeping only. It never touches the filesystem; callers
//! reverse or replay the records it hands back (see [`crate::executor`]).

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use stagehand_core::{DEFAULT_HISTORY_LIMIT, TransferMode};
use strum::IntoStaticStr;
use thiserror::Error;
use tracing::debug;

/// A completed operation, sufficient to reverse or replay it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecordKind {
    /// Items were pasted into a directory.
    Paste {
        mode: TransferMode,
        /// `(source, destination)` pairs, in paste order.
        pairs: Vec<(PathBuf, PathBuf)>,
        destination: PathBuf,
    },
    /// A path was deleted. The trash location is not captured.
    Delete { path: PathBuf, trashed: bool },
    /// A file or directory was renamed.
    Rename { from: PathBuf, to: PathBuf },
    /// An empty file was created.
    CreateFile { path: PathBuf },
    /// A directory was created.
    CreateDirectory { path: PathBuf },
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl RecordKind {
    /// Short machine-readable name of the kind.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Human-readable description of what happened.
    pub fn describe(&self) -> String {
        match self {
            Self::Paste {
                mode,
                pairs,
                destination,
            } => format!(
                "{} {} {} into '{}'",
                mode.past_tense(),
                pairs.len(),
                if pairs.len() == 1 { "item" } else { "items" },
                destination.display()
            ),
            Self::Delete { path, trashed } => {
                if *trashed {
                    format!("Moved '{}' to trash", display_name(path))
                } else {
                    format!("Permanently deleted '{}'", display_name(path))
                }
            }
            Self::Rename { from, to } => {
                format!("Renamed '{}' to '{}'", display_name(from), display_name(to))
            }
            Self::CreateFile { path } => format!("Created file '{}'", display_name(path)),
            Self::CreateDirectory { path } => {
                format!("Created directory '{}'", display_name(path))
            }
        }
    }

    /// Get a description of how to undo this operation.
    pub fn undo_description(&self) -> String {
        match self {
            Self::Paste { mode, pairs, .. } => {
                let noun = if pairs.len() == 1 { "item" } else { "items" };
                match mode {
                    TransferMode::Copy => format!("Delete {} copied {}", pairs.len(), noun),
                    TransferMode::Move => {
                        format!("Move {} {} back to original location", pairs.len(), noun)
                    }
                }
            }
            Self::Delete { trashed: true, .. } => "Cannot undo, sent to trash".to_string(),
            Self::Delete { trashed: false, .. } => {
                "Cannot undo permanent deletion".to_string()
            }
            Self::Rename { from, .. } => format!("Rename back to '{}'", display_name(from)),
            Self::CreateFile { .. } => "Delete the created file".to_string(),
            Self::CreateDirectory { .. } => "Delete the created directory".to_string(),
        }
    }

    /// Check if the filesystem effect of this operation can be reversed.
    pub fn is_reversible(&self) -> bool {
        !matches!(self, Self::Delete { .. })
    }

    fn validate(&self) -> Result<(), HistoryError> {
        match self {
            Self::Paste { pairs, .. } if pairs.is_empty() => Err(HistoryError::EmptyPaste),
            Self::Rename { from, to } if from == to => Err(HistoryError::NoopRename {
                path: from.clone(),
            }),
            _ => Ok(()),
        }
    }
}

/// An entry in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Unique ID for this record within its history.
    pub id: u64,
    /// When the operation was recorded.
    pub recorded_at: DateTime<Local>,
    /// The operation that was performed.
    pub kind: RecordKind,
    /// Human-readable description.
    pub description: String,
}

impl OperationRecord {
    fn new(id: u64, kind: RecordKind) -> Self {
        Self {
            id,
            recorded_at: Local::now(),
            description: kind.describe(),
            kind,
        }
    }
}

/// Misuse of the history API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// A paste record must describe at least one transferred item.
    #[error("Paste record has no transferred items")]
    EmptyPaste,

    /// A rename record must change the path.
    #[error("Rename record does not change the path: {path}")]
    NoopRename { path: PathBuf },
}

/// Undo/redo stacks with a bounded undo depth.
///
/// Recording clears the redo stack. A bound of 0 disables history.
#[derive(Debug)]
pub struct History {
    undo: VecDeque<OperationRecord>,
    redo: VecDeque<OperationRecord>,
    max_size: usize,
    next_id: u64,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Create a new history retaining at most `max_size` undoable records.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(max_size.min(1000)),
            redo: VecDeque::new(),
            max_size,
            next_id: 0,
        }
    }

    /// Record a completed operation.
    ///
    /// Returns the ID assigned to the record.
    pub fn record(&mut self, kind: RecordKind) -> Result<u64, HistoryError> {
        kind.validate()?;

        let id = self.next_id;
        self.next_id += 1;

        self.undo.push_back(OperationRecord::new(id, kind));
        while self.undo.len() > self.max_size {
            if let Some(evicted) = self.undo.pop_front() {
                debug!(id = evicted.id, "evicted oldest history record");
            }
        }
        self.redo.clear();

        Ok(id)
    }

    /// Record a paste.
    pub fn record_paste(
        &mut self,
        mode: TransferMode,
        pairs: Vec<(PathBuf, PathBuf)>,
        destination: PathBuf,
    ) -> Result<u64, HistoryError> {
        self.record(RecordKind::Paste {
            mode,
            pairs,
            destination,
        })
    }

    /// Record a delete.
    pub fn record_delete(&mut self, path: PathBuf, trashed: bool) -> Result<u64, HistoryError> {
        self.record(RecordKind::Delete { path, trashed })
    }

    /// Record a rename.
    pub fn record_rename(&mut self, from: PathBuf, to: PathBuf) -> Result<u64, HistoryError> {
        self.record(RecordKind::Rename { from, to })
    }

    /// Record a file creation.
    pub fn record_create_file(&mut self, path: PathBuf) -> Result<u64, HistoryError> {
        self.record(RecordKind::CreateFile { path })
    }

    /// Record a directory creation.
    pub fn record_create_directory(&mut self, path: PathBuf) -> Result<u64, HistoryError> {
        self.record(RecordKind::CreateDirectory { path })
    }

    /// Check if there is anything to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Check if there is anything to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Move the most recent record onto the redo stack and return it.
    ///
    /// Returns `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<OperationRecord> {
        let record = self.undo.pop_back()?;
        self.redo.push_back(record.clone());
        Some(record)
    }

    /// Move the most recently undone record back onto the undo stack and return it.
    ///
    /// Returns `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<OperationRecord> {
        let record = self.redo.pop_back()?;
        self.undo.push_back(record.clone());
        Some(record)
    }

    /// Peek at the record `undo` would return.
    pub fn peek_undo(&self) -> Option<&OperationRecord> {
        self.undo.back()
    }

    /// Peek at the record `redo` would return.
    pub fn peek_redo(&self) -> Option<&OperationRecord> {
        self.redo.back()
    }

    /// Get the number of undoable records.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Get the number of redoable records.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// The configured undo depth.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Check if both stacks are empty.
    pub fn is_empty(&self) -> bool {
        self.undo.is_empty() && self.redo.is_empty()
    }

    /// Clear both stacks.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Iterate over undoable records, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &OperationRecord> {
        self.undo.iter()
    }

    /// Snapshot of the undo stack, oldest first.
    pub fn undo_records(&self) -> Vec<&OperationRecord> {
        self.undo.iter().collect()
    }

    /// Iterate over redoable records, oldest undo first.
    pub fn redo_iter(&self) -> impl DoubleEndedIterator<Item = &OperationRecord> {
        self.redo.iter()
    }
}
