//! File operation engine for stagehand.
//!
//! Stage paths on a [`Clipboard`], paste them into a directory without ever
//! overwriting, and keep a bounded [`History`] that can reverse or replay
//! what was done. [`Session`] ties the pieces together.
//!
//! Batches never fail as a whole: every item is processed independently and
//! ends up in a [`BatchReport`] as done or skipped.

mod clipboard;
mod conflict;
mod copy;
mod create;
mod delete;
mod executor;
mod history;
mod move_op;
mod operation;
mod progress;
mod rename;
mod session;

pub use clipboard::{Clipboard, PasteBatch};
pub use conflict::{duplicate_destination, is_within, numbered_name, resolve_destination};
pub use copy::{CopyOptions, copy_item, duplicate};
pub use create::{create_directory, create_file};
pub use delete::delete;
pub use executor::{
    Direction, OperationEvent, ReversalError, apply, replay, reverse, start_paste, start_reversal,
};
pub use history::{History, HistoryError, OperationRecord, RecordKind};
pub use move_op::move_item;
pub use operation::{ItemOutcome, OperationError, SkipReason};
pub use progress::{BatchReport, OperationProgress, OperationType};
pub use rename::{rename, validate_filename};
pub use session::{Session, UndoOutcome};

/// Default channel buffer size for operation progress updates.
pub const OPERATION_CHANNEL_SIZE: usize = 100;
