//! Clipboard staging and paste.

use std::path::{Path, PathBuf};

use stagehand_core::TransferMode;
use tracing::{debug, info, warn};

use crate::conflict::{path_exists, resolve_destination};
use crate::copy::{CopyOptions, copy_item};
use crate::move_op::move_item;
use crate::operation::{ItemOutcome, SkipReason};
use crate::progress::{BatchReport, OperationType};

/// Paths staged for a deferred copy or move.
///
/// Staging never touches the filesystem; [`Clipboard::commit`] does the work.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    items: Vec<PathBuf>,
    mode: Option<TransferMode>,
    options: CopyOptions,
}

impl Clipboard {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty clipboard that pastes with the given copy options.
    pub fn with_options(options: CopyOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Stage paths for copying, replacing whatever was staged before.
    pub fn stage_copy<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.stage(TransferMode::Copy, paths);
    }

    /// Stage paths for moving, replacing whatever was staged before.
    pub fn stage_cut<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.stage(TransferMode::Move, paths);
    }

    fn stage<I, P>(&mut self, mode: TransferMode, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.items = paths.into_iter().map(Into::into).collect();
        self.mode = Some(mode);
        debug!(mode = %mode, count = self.items.len(), "staged clipboard");
    }

    /// Check if anything is staged.
    pub fn has_staged(&self) -> bool {
        !self.items.is_empty()
    }

    /// Clear the clipboard.
    pub fn clear(&mut self) {
        self.items.clear();
        self.mode = None;
    }

    /// The staged paths, in staging order.
    pub fn items(&self) -> &[PathBuf] {
        &self.items
    }

    /// The pending transfer mode.
    pub fn mode(&self) -> Option<TransferMode> {
        self.mode
    }

    /// Get the number of staged paths.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the clipboard holds no paths.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if a path is staged.
    pub fn contains(&self, path: &Path) -> bool {
        self.items.iter().any(|p| p == path)
    }

    /// Snapshot the staged set for execution elsewhere.
    ///
    /// Returns `None` when no mode is pending. Pair with
    /// [`Clipboard::finish_commit`] once the batch has run.
    pub fn begin_commit(&self) -> Option<PasteBatch> {
        self.mode.map(|mode| PasteBatch {
            mode,
            items: self.items.clone(),
            options: self.options,
        })
    }

    /// Apply the post-paste policy for a finished batch.
    ///
    /// A move that relocated at least one item clears the clipboard. Copies
    /// stay staged so they can be pasted again elsewhere.
    pub fn finish_commit(&mut self, report: &BatchReport) {
        if report.operation_type == OperationType::Move && report.succeeded() > 0 {
            self.clear();
        }
    }

    /// Paste the staged items into `destination`.
    ///
    /// Never fails as a whole: every item succeeds or is skipped on its own.
    pub fn commit(&mut self, destination: impl AsRef<Path>) -> BatchReport {
        let Some(batch) = self.begin_commit() else {
            return BatchReport::new(OperationType::Copy);
        };
        let report = batch.run(destination.as_ref());
        self.finish_commit(&report);
        report
    }
}

/// A snapshot of the clipboard, ready to paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteBatch {
    /// Copy or move.
    pub mode: TransferMode,
    /// Source paths, in staging order.
    pub items: Vec<PathBuf>,
    /// Copy behaviour.
    pub options: CopyOptions,
}

impl PasteBatch {
    /// The report type for this batch.
    pub fn operation_type(&self) -> OperationType {
        self.mode.into()
    }

    /// Paste every item into `destination`, in order.
    pub fn run(&self, destination: &Path) -> BatchReport {
        let mut report = BatchReport::new(self.operation_type());
        for source in &self.items {
            report.push(transfer_into(self.mode, self.options, source, destination));
        }

        info!(
            mode = %self.mode,
            destination = %destination.display(),
            succeeded = report.succeeded(),
            total = report.total(),
            "paste finished"
        );
        report
    }
}

/// Transfer one staged item into `destination_dir` under a free name.
pub(crate) fn transfer_into(
    mode: TransferMode,
    options: CopyOptions,
    source: &Path,
    destination_dir: &Path,
) -> ItemOutcome {
    if !path_exists(source) {
        debug!(source = %source.display(), "staged path vanished, skipping");
        return ItemOutcome::skipped(source.to_path_buf(), SkipReason::SourceMissing);
    }

    let Some(name) = source.file_name() else {
        return ItemOutcome::skipped(
            source.to_path_buf(),
            SkipReason::failed("path has no file name"),
        );
    };

    let target = resolve_destination(destination_dir, name);
    let result = match mode {
        TransferMode::Copy => copy_item(source, &target, options),
        TransferMode::Move => move_item(source, &target, options),
    };

    match result {
        Ok(bytes) => {
            debug!(source = %source.display(), dest = %target.display(), "transferred");
            ItemOutcome::transferred(source.to_path_buf(), target, bytes)
        }
        Err(e) => {
            warn!(source = %source.display(), error = %e, "paste item skipped");
            ItemOutcome::skipped(source.to_path_buf(), SkipReason::from_error(source, &e))
        }
    }
}
