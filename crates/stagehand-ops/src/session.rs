//! A clipboard and a history bound together into one undoable timeline.

use std::path::{Path, PathBuf};

use stagehand_core::{EngineConfig, FsError, TransferMode};
use tracing::debug;

use crate::clipboard::Clipboard;
use crate::copy::{self, CopyOptions};
use crate::create;
use crate::delete;
use crate::executor::{self, Direction, OperationEvent, ReversalError};
use crate::history::{History, OperationRecord, RecordKind};
use crate::progress::{BatchReport, OperationProgress};
use crate::rename;

/// Result of an undo or redo request.
#[derive(Debug)]
pub enum UndoOutcome {
    /// The stack was empty.
    Nothing,
    /// The record was applied; individual items may still have been skipped.
    Applied {
        record: OperationRecord,
        report: BatchReport,
    },
    /// The record moved between stacks but its effect cannot be applied.
    Unsupported {
        record: OperationRecord,
        reason: ReversalError,
    },
}

/// One user's clipboard and history.
///
/// Every successful operation is recorded, so it can be undone. Drive a
/// session through `&mut`; wrap it in a mutex to share it.
#[derive(Debug)]
pub struct Session {
    clipboard: Clipboard,
    history: History,
    options: CopyOptions,
    use_trash: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Session {
    /// Create a session from engine configuration.
    pub fn new(config: &EngineConfig) -> Self {
        let options = CopyOptions {
            preserve_timestamps: config.preserve_timestamps,
        };
        Self {
            clipboard: Clipboard::with_options(options),
            history: History::new(config.history_limit),
            options,
            use_trash: config.use_trash,
        }
    }

    /// The clipboard.
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// The history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Whether deletes go to the trash.
    pub fn uses_trash(&self) -> bool {
        self.use_trash
    }

    /// Stage paths for copying.
    pub fn copy<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.clipboard.stage_copy(paths);
    }

    /// Stage paths for moving.
    pub fn cut<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.clipboard.stage_cut(paths);
    }

    /// Clear the clipboard.
    pub fn clear_clipboard(&mut self) {
        self.clipboard.clear();
    }

    /// Paste the clipboard into `destination` and record what was transferred.
    pub fn paste(&mut self, destination: impl AsRef<Path>) -> BatchReport {
        let destination = destination.as_ref();
        let Some(batch) = self.clipboard.begin_commit() else {
            return self.clipboard.commit(destination);
        };

        let report = batch.run(destination);
        self.clipboard.finish_commit(&report);
        self.record_paste(batch.mode, &report, destination);
        report
    }

    /// Paste on a background task, calling `on_progress` before each item.
    pub async fn paste_with_progress<F>(
        &mut self,
        destination: impl AsRef<Path>,
        mut on_progress: F,
    ) -> BatchReport
    where
        F: FnMut(&OperationProgress),
    {
        let destination = destination.as_ref();
        let Some(batch) = self.clipboard.begin_commit() else {
            return self.clipboard.commit(destination);
        };
        let mode = batch.mode;
        let operation_type = batch.operation_type();

        let mut rx = executor::start_paste(batch, destination.to_path_buf());
        let mut report = BatchReport::new(operation_type);
        while let Some(event) = rx.recv().await {
            match event {
                OperationEvent::Progress(progress) => on_progress(&progress),
                OperationEvent::Complete(done) => report = done,
                OperationEvent::Unsupported(_) => {}
            }
        }

        self.clipboard.finish_commit(&report);
        self.record_paste(mode, &report, destination);
        report
    }

    fn record_paste(&mut self, mode: TransferMode, report: &BatchReport, destination: &Path) {
        let pairs = report.pairs();
        if pairs.is_empty() {
            return;
        }
        self.remember(RecordKind::Paste {
            mode,
            pairs,
            destination: destination.to_path_buf(),
        });
    }

    fn remember(&mut self, kind: RecordKind) {
        if let Err(e) = self.history.record(kind) {
            debug!(error = %e, "operation not recorded");
        }
    }

    /// Undo the most recent operation.
    pub fn undo(&mut self) -> UndoOutcome {
        match self.history.undo() {
            Some(record) => self.apply(record, Direction::Undo),
            None => UndoOutcome::Nothing,
        }
    }

    /// Redo the most recently undone operation.
    pub fn redo(&mut self) -> UndoOutcome {
        match self.history.redo() {
            Some(record) => self.apply(record, Direction::Redo),
            None => UndoOutcome::Nothing,
        }
    }

    fn apply(&self, record: OperationRecord, direction: Direction) -> UndoOutcome {
        match executor::apply(&record, direction, self.options) {
            Ok(report) => UndoOutcome::Applied { record, report },
            Err(reason) => UndoOutcome::Unsupported { record, reason },
        }
    }

    /// Delete a path, to the trash unless the session deletes permanently.
    ///
    /// Returns the number of bytes freed.
    pub fn delete(&mut self, path: &Path) -> Result<u64, FsError> {
        let bytes = delete::delete(path, self.use_trash)?;
        self.remember(RecordKind::Delete {
            path: path.to_path_buf(),
            trashed: self.use_trash,
        });
        Ok(bytes)
    }

    /// Rename a path within its directory. Returns the new path.
    pub fn rename(&mut self, path: &Path, new_name: &str) -> Result<PathBuf, FsError> {
        let new_path = rename::rename(path, new_name)?;
        self.remember(RecordKind::Rename {
            from: path.to_path_buf(),
            to: new_path.clone(),
        });
        Ok(new_path)
    }

    /// Create an empty file.
    pub fn create_file(&mut self, path: &Path) -> Result<(), FsError> {
        create::create_file(path)?;
        self.remember(RecordKind::CreateFile {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    /// Create a directory.
    pub fn create_directory(&mut self, path: &Path) -> Result<(), FsError> {
        create::create_directory(path)?;
        self.remember(RecordKind::CreateDirectory {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    /// Copy a path next to itself. Returns the path of the copy.
    pub fn duplicate(&mut self, path: &Path) -> Result<PathBuf, FsError> {
        let copy = copy::duplicate(path, self.options)?;
        let parent = copy.parent().map(Path::to_path_buf).unwrap_or_default();
        self.remember(RecordKind::Paste {
            mode: TransferMode::Copy,
            pairs: vec![(path.to_path_buf(), copy.clone())],
            destination: parent,
        });
        Ok(copy)
    }

    /// Forget all recorded operations.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
