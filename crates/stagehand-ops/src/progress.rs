//! Progress and report types for file operations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stagehand_core::TransferMode;
use strum::Display;

use crate::operation::{ItemOutcome, OperationError};

/// The type of operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Copy,
    Move,
    Delete,
    Rename,
    #[strum(to_string = "Create file")]
    CreateFile,
    #[strum(to_string = "Create directory")]
    CreateDirectory,
}

impl OperationType {
    fn past_tense(self) -> &'static str {
        match self {
            Self::Copy => "Copied",
            Self::Move => "Moved",
            Self::Delete => "Deleted",
            Self::Rename => "Renamed",
            Self::CreateFile | Self::CreateDirectory => "Created",
        }
    }
}

impl From<TransferMode> for OperationType {
    fn from(mode: TransferMode) -> Self {
        match mode {
            TransferMode::Copy => Self::Copy,
            TransferMode::Move => Self::Move,
        }
    }
}

/// Progress information for an ongoing batch.
#[derive(Debug, Clone)]
pub struct OperationProgress {
    /// The type of operation.
    pub operation_type: OperationType,
    /// Number of items finished (processed or skipped).
    pub items_completed: usize,
    /// Total number of items in the batch.
    pub items_total: usize,
    /// Number of bytes processed so far.
    pub bytes_processed: u64,
    /// The item currently being processed.
    pub current: Option<PathBuf>,
}

impl OperationProgress {
    /// Create a new progress tracker for an operation.
    pub fn new(operation_type: OperationType, items_total: usize) -> Self {
        Self {
            operation_type,
            items_completed: 0,
            items_total,
            bytes_processed: 0,
            current: None,
        }
    }

    /// Get the progress as a percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.items_total > 0 {
            (self.items_completed as f64 / self.items_total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Update the item currently being processed.
    pub fn set_current(&mut self, path: Option<PathBuf>) {
        self.current = path;
    }

    /// Increment the completed count and add bytes.
    pub fn complete_item(&mut self, bytes: u64) {
        self.items_completed += 1;
        self.bytes_processed += bytes;
    }
}

/// Result of a completed batch: one outcome per item, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// The type of operation.
    pub operation_type: OperationType,
    /// Per-item outcomes.
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    /// Create an empty report.
    pub fn new(operation_type: OperationType) -> Self {
        Self {
            operation_type,
            outcomes: Vec::new(),
        }
    }

    /// Append an item outcome.
    pub fn push(&mut self, outcome: ItemOutcome) {
        self.outcomes.push(outcome);
    }

    /// Number of items successfully processed.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_done()).count()
    }

    /// Number of items that were skipped.
    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Number of items attempted.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Total bytes processed.
    pub fn bytes_processed(&self) -> u64 {
        self.outcomes.iter().map(ItemOutcome::bytes).sum()
    }

    /// Check if every item succeeded.
    pub fn is_success(&self) -> bool {
        self.skipped() == 0
    }

    /// Check if nothing succeeded.
    pub fn is_empty(&self) -> bool {
        self.succeeded() == 0
    }

    /// Ordered `(source, destination)` pairs of the items that were transferred.
    pub fn pairs(&self) -> Vec<(PathBuf, PathBuf)> {
        self.outcomes
            .iter()
            .filter_map(ItemOutcome::pair)
            .map(|(s, d)| (s.to_path_buf(), d.to_path_buf()))
            .collect()
    }

    /// Destinations of the items that were transferred.
    pub fn destinations(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter_map(ItemOutcome::pair)
            .map(|(_, d)| d)
            .collect()
    }

    /// Errors for every skipped item.
    pub fn errors(&self) -> Vec<OperationError> {
        self.outcomes.iter().filter_map(ItemOutcome::error).collect()
    }

    /// Get a human-readable summary of the operation.
    pub fn summary(&self) -> String {
        let action = self.operation_type.past_tense();
        let noun = if self.total() == 1 { "item" } else { "items" };

        if self.is_success() {
            format!("{} {} {}", action, self.succeeded(), noun)
        } else {
            format!(
                "{} {} of {} {}, {} skipped",
                action,
                self.succeeded(),
                self.total(),
                noun,
                self.skipped()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::SkipReason;

    #[test]
    fn test_report_counts_and_summary() {
        let mut report = BatchReport::new(OperationType::Copy);
        report.push(ItemOutcome::transferred("/a".into(), "/d/a".into(), 10));
        report.push(ItemOutcome::skipped("/b".into(), SkipReason::SourceMissing));
        report.push(ItemOutcome::transferred("/c".into(), "/d/c".into(), 5));

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.bytes_processed(), 15);
        assert_eq!(report.summary(), "Copied 2 of 3 items, 1 skipped");
        assert_eq!(
            report.pairs(),
            vec![
                (PathBuf::from("/a"), PathBuf::from("/d/a")),
                (PathBuf::from("/c"), PathBuf::from("/d/c")),
            ]
        );
        assert_eq!(report.errors().len(), 1);
    }

    #[test]
    fn test_empty_report() {
        let report = BatchReport::new(OperationType::Move);
        assert!(report.is_empty());
        assert!(report.is_success());
        assert_eq!(report.summary(), "Moved 0 items");
    }

    #[test]
    fn test_progress_percentage() {
        let mut progress = OperationProgress::new(OperationType::Copy, 4);
        assert_eq!(progress.percentage(), 0.0);
        progress.complete_item(100);
        assert_eq!(progress.percentage(), 25.0);
        assert_eq!(progress.bytes_processed, 100);
    }
}
