//! Reversal and replay of recorded operations, sync and on a background task.

use std::path::{Path, PathBuf};

use stagehand_core::{FsError, TransferMode};
use strum::Display;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::OPERATION_CHANNEL_SIZE;
use crate::clipboard::{PasteBatch, transfer_into};
use crate::copy::{CopyOptions, copy_item};
use crate::create::{create_directory, create_file};
use crate::delete::{remove_empty_dir, remove_path};
use crate::history::{OperationRecord, RecordKind};
use crate::move_op::move_item;
use crate::operation::{ItemOutcome, SkipReason};
use crate::progress::{BatchReport, OperationProgress, OperationType};
use crate::rename::rename_to;

/// Which way a record is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// Reverse the record's effect.
    Undo,
    /// Apply the record's effect again.
    Redo,
}

/// A record that cannot be applied in the requested direction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReversalError {
    #[error("Cannot {direction} {kind}: {reason}")]
    Unsupported {
        direction: Direction,
        kind: &'static str,
        reason: String,
    },
}

/// Event sent from a background operation.
#[derive(Debug)]
pub enum OperationEvent {
    /// Progress update, sent before each item.
    Progress(OperationProgress),
    /// The batch finished.
    Complete(BatchReport),
    /// The record cannot be applied; nothing was touched.
    Unsupported(ReversalError),
}

/// One unit of filesystem work.
#[derive(Debug, Clone)]
enum Step {
    /// Paste `source` into `directory` under a free name.
    Paste {
        mode: TransferMode,
        source: PathBuf,
        directory: PathBuf,
    },
    /// Copy or move to an exact destination, never renaming.
    Transfer {
        mode: TransferMode,
        source: PathBuf,
        destination: PathBuf,
    },
    /// Remove a file or tree.
    Remove(PathBuf),
    /// Remove a file, refusing directories.
    RemoveFile(PathBuf),
    /// Remove a directory only if it is empty.
    RemoveEmptyDir(PathBuf),
    Rename {
        from: PathBuf,
        to: PathBuf,
    },
    CreateFile(PathBuf),
    CreateDirectory(PathBuf),
}

impl Step {
    fn path(&self) -> &Path {
        match self {
            Self::Paste { source, .. } | Self::Transfer { source, .. } => source,
            Self::Remove(path)
            | Self::RemoveFile(path)
            | Self::RemoveEmptyDir(path)
            | Self::CreateFile(path)
            | Self::CreateDirectory(path) => path,
            Self::Rename { from, .. } => from,
        }
    }
}

/// A list of steps and the report type they produce.
#[derive(Debug)]
struct Plan {
    operation_type: OperationType,
    steps: Vec<Step>,
}

impl Plan {
    fn paste(batch: &PasteBatch, directory: &Path) -> Self {
        Self {
            operation_type: batch.operation_type(),
            steps: batch
                .items
                .iter()
                .map(|source| Step::Paste {
                    mode: batch.mode,
                    source: source.clone(),
                    directory: directory.to_path_buf(),
                })
                .collect(),
        }
    }

    fn for_record(record: &OperationRecord, direction: Direction) -> Result<Self, ReversalError> {
        let (operation_type, steps): (OperationType, Vec<Step>) = match (&record.kind, direction) {
            (
                RecordKind::Paste {
                    mode: TransferMode::Copy,
                    pairs,
                    ..
                },
                Direction::Undo,
            ) => (
                OperationType::Delete,
                pairs
                    .iter()
                    .rev()
                    .map(|(_, dest)| Step::Remove(dest.clone()))
                    .collect(),
            ),
            (
                RecordKind::Paste {
                    mode: TransferMode::Move,
                    pairs,
                    ..
                },
                Direction::Undo,
            ) => (
                OperationType::Move,
                pairs
                    .iter()
                    .rev()
                    .map(|(source, dest)| Step::Transfer {
                        mode: TransferMode::Move,
                        source: dest.clone(),
                        destination: source.clone(),
                    })
                    .collect(),
            ),
            (RecordKind::Paste { mode, pairs, .. }, Direction::Redo) => (
                OperationType::from(*mode),
                pairs
                    .iter()
                    .map(|(source, dest)| Step::Transfer {
                        mode: *mode,
                        source: source.clone(),
                        destination: dest.clone(),
                    })
                    .collect(),
            ),
            (RecordKind::Delete { trashed, .. }, _) => {
                let reason = if *trashed {
                    "item was sent to the trash"
                } else {
                    "item was permanently deleted"
                };
                return Err(ReversalError::Unsupported {
                    direction,
                    kind: record.kind.name(),
                    reason: reason.to_string(),
                });
            }
            (RecordKind::Rename { from, to }, Direction::Undo) => (
                OperationType::Rename,
                vec![Step::Rename {
                    from: to.clone(),
                    to: from.clone(),
                }],
            ),
            (RecordKind::Rename { from, to }, Direction::Redo) => (
                OperationType::Rename,
                vec![Step::Rename {
                    from: from.clone(),
                    to: to.clone(),
                }],
            ),
            (RecordKind::CreateFile { path }, Direction::Undo) => {
                (OperationType::Delete, vec![Step::RemoveFile(path.clone())])
            }
            (RecordKind::CreateFile { path }, Direction::Redo) => {
                (OperationType::CreateFile, vec![Step::CreateFile(path.clone())])
            }
            (RecordKind::CreateDirectory { path }, Direction::Undo) => (
                OperationType::Delete,
                vec![Step::RemoveEmptyDir(path.clone())],
            ),
            (RecordKind::CreateDirectory { path }, Direction::Redo) => (
                OperationType::CreateDirectory,
                vec![Step::CreateDirectory(path.clone())],
            ),
        };

        Ok(Self {
            operation_type,
            steps,
        })
    }

    fn run(self, options: CopyOptions) -> BatchReport {
        let mut report = BatchReport::new(self.operation_type);
        for step in self.steps {
            report.push(run_step(step, options));
        }
        report
    }
}

fn run_step(step: Step, options: CopyOptions) -> ItemOutcome {
    let outcome = match step {
        Step::Paste {
            mode,
            source,
            directory,
        } => return transfer_into(mode, options, &source, &directory),
        Step::Transfer {
            mode,
            source,
            destination,
        } => {
            let result = match mode {
                TransferMode::Copy => copy_item(&source, &destination, options),
                TransferMode::Move => move_item(&source, &destination, options),
            };
            result
                .map(|bytes| ItemOutcome::transferred(source.clone(), destination, bytes))
                .map_err(|e| (source, e))
        }
        Step::Remove(path) => remove_path(&path)
            .map(|()| ItemOutcome::done(path.clone()))
            .map_err(|e| (path, e)),
        Step::RemoveFile(path) => std::fs::remove_file(&path)
            .map_err(|e| FsError::io(&path, e))
            .map(|()| ItemOutcome::done(path.clone()))
            .map_err(|e| (path, e)),
        Step::RemoveEmptyDir(path) => remove_empty_dir(&path)
            .map(|()| ItemOutcome::done(path.clone()))
            .map_err(|e| (path, e)),
        Step::Rename { from, to } => rename_to(&from, &to)
            .map(|()| ItemOutcome::transferred(from.clone(), to, 0))
            .map_err(|e| (from, e)),
        Step::CreateFile(path) => create_file(&path)
            .map(|()| ItemOutcome::done(path.clone()))
            .map_err(|e| (path, e)),
        Step::CreateDirectory(path) => create_directory(&path)
            .map(|()| ItemOutcome::done(path.clone()))
            .map_err(|e| (path, e)),
    };

    outcome.unwrap_or_else(|(path, e)| {
        warn!(path = %path.display(), error = %e, "item skipped");
        let reason = SkipReason::from_error(&path, &e);
        ItemOutcome::skipped(path, reason)
    })
}

/// Reverse a record's filesystem effect.
pub fn reverse(record: &OperationRecord) -> Result<BatchReport, ReversalError> {
    apply(record, Direction::Undo, CopyOptions::default())
}

/// Apply a record's filesystem effect again, at its recorded destinations.
pub fn replay(record: &OperationRecord) -> Result<BatchReport, ReversalError> {
    apply(record, Direction::Redo, CopyOptions::default())
}

/// Apply `record` in `direction`.
///
/// Items are processed independently; a failing item is skipped and the
/// rest still run.
pub fn apply(
    record: &OperationRecord,
    direction: Direction,
    options: CopyOptions,
) -> Result<BatchReport, ReversalError> {
    let plan = Plan::for_record(record, direction)?;
    let report = plan.run(options);
    info!(
        id = record.id,
        %direction,
        succeeded = report.succeeded(),
        total = report.total(),
        "applied history record"
    );
    Ok(report)
}

/// Start pasting `batch` into `destination` on a background task.
///
/// The caller applies [`crate::Clipboard::finish_commit`] and records the
/// resulting report.
pub fn start_paste(batch: PasteBatch, destination: PathBuf) -> mpsc::Receiver<OperationEvent> {
    let (tx, rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);
    let options = batch.options;
    let plan = Plan::paste(&batch, &destination);

    tokio::spawn(async move {
        run_plan(plan, options, tx).await;
    });

    rx
}

/// Start applying `record` in `direction` on a background task.
pub fn start_reversal(
    record: OperationRecord,
    direction: Direction,
    options: CopyOptions,
) -> mpsc::Receiver<OperationEvent> {
    let (tx, rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);

    tokio::spawn(async move {
        match Plan::for_record(&record, direction) {
            Ok(plan) => run_plan(plan, options, tx).await,
            Err(e) => {
                debug!(id = record.id, error = %e, "record not applicable");
                let _ = tx.send(OperationEvent::Unsupported(e)).await;
            }
        }
    });

    rx
}

async fn run_plan(plan: Plan, options: CopyOptions, tx: mpsc::Sender<OperationEvent>) {
    let mut progress = OperationProgress::new(plan.operation_type, plan.steps.len());
    let mut report = BatchReport::new(plan.operation_type);

    for step in plan.steps {
        let path = step.path().to_path_buf();
        progress.set_current(Some(path.clone()));
        let _ = tx.send(OperationEvent::Progress(progress.clone())).await;

        let outcome = tokio::task::spawn_blocking(move || run_step(step, options))
            .await
            .unwrap_or_else(|e| {
                ItemOutcome::skipped(path, SkipReason::failed(format!("task failed: {e}")))
            });

        progress.complete_item(outcome.bytes());
        report.push(outcome);
    }

    progress.set_current(None);
    info!(
        operation = %report.operation_type,
        succeeded = report.succeeded(),
        total = report.total(),
        "background operation finished"
    );
    let _ = tx.send(OperationEvent::Complete(report)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::History;
    use std::fs;
    use tempfile::TempDir;

    fn single(kind: RecordKind) -> OperationRecord {
        let mut history = History::new(1);
        history.record(kind).unwrap();
        history.undo().unwrap()
    }

    #[test]
    fn test_reverse_copy_paste_removes_destinations() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.txt");
        let dest = dir.path().join("a (1).txt");
        fs::write(&source, "a").unwrap();
        fs::write(&dest, "a").unwrap();

        let record = single(RecordKind::Paste {
            mode: TransferMode::Copy,
            pairs: vec![(source.clone(), dest.clone())],
            destination: dir.path().to_path_buf(),
        });
        let report = reverse(&record).unwrap();

        assert_eq!(report.succeeded(), 1);
        assert!(!dest.exists());
        assert!(source.exists());
    }

    #[test]
    fn test_replay_copy_does_not_rename() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.txt");
        let dest = dir.path().join("b.txt");
        fs::write(&source, "new").unwrap();
        fs::write(&dest, "occupied").unwrap();

        let record = single(RecordKind::Paste {
            mode: TransferMode::Copy,
            pairs: vec![(source, dest.clone())],
            destination: dir.path().to_path_buf(),
        });
        let report = replay(&record).unwrap();

        assert_eq!(report.skipped(), 1);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "occupied");
        assert!(!dir.path().join("b (1).txt").exists());
    }

    #[test]
    fn test_reverse_move_paste_in_reverse_order() {
        let dir = TempDir::new().unwrap();
        let dest_dir = dir.path().join("dest");
        fs::create_dir(&dest_dir).unwrap();
        fs::write(dest_dir.join("a"), "a").unwrap();
        fs::write(dest_dir.join("b"), "b").unwrap();

        let record = single(RecordKind::Paste {
            mode: TransferMode::Move,
            pairs: vec![
                (dir.path().join("a"), dest_dir.join("a")),
                (dir.path().join("b"), dest_dir.join("b")),
            ],
            destination: dest_dir.clone(),
        });
        let report = reverse(&record).unwrap();

        let restored: Vec<_> = report.pairs().into_iter().map(|(_, to)| to).collect();
        assert_eq!(restored, vec![dir.path().join("b"), dir.path().join("a")]);
        assert!(dir.path().join("a").exists());
        assert!(!dest_dir.join("b").exists());
    }

    #[test]
    fn test_delete_is_unsupported_both_ways() {
        let record = single(RecordKind::Delete {
            path: PathBuf::from("/gone"),
            trashed: true,
        });

        for direction in [Direction::Undo, Direction::Redo] {
            let err = apply(&record, direction, CopyOptions::default()).unwrap_err();
            let ReversalError::Unsupported { kind, .. } = &err;
            assert_eq!(*kind, "delete");
            assert!(err.to_string().starts_with(&format!("Cannot {direction} delete")));
        }
    }

    #[test]
    fn test_rename_round_trip() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("old");
        let to = dir.path().join("new");
        fs::write(&to, "x").unwrap();

        let record = single(RecordKind::Rename {
            from: from.clone(),
            to: to.clone(),
        });

        reverse(&record).unwrap();
        assert!(from.exists() && !to.exists());
        replay(&record).unwrap();
        assert!(to.exists() && !from.exists());
    }

    #[test]
    fn test_created_directory_only_removed_when_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("made");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("later.txt"), "x").unwrap();

        let record = single(RecordKind::CreateDirectory { path: path.clone() });
        let report = reverse(&record).unwrap();

        assert_eq!(report.skipped(), 1);
        assert!(path.join("later.txt").exists());
    }

    #[test]
    fn test_create_file_replay() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("made.txt");

        let record = single(RecordKind::CreateFile { path: path.clone() });
        replay(&record).unwrap();
        assert!(path.is_file());
        reverse(&record).unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_start_reversal_reports_unsupported() {
        let record = single(RecordKind::Delete {
            path: PathBuf::from("/gone"),
            trashed: false,
        });
        let mut rx = start_reversal(record, Direction::Undo, CopyOptions::default());

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, OperationEvent::Unsupported(_)));
        assert!(rx.recv().await.is_none());
    }
}
