//! Move primitive.

use std::fs;
use std::io;
use std::path::Path;

use stagehand_core::FsError;
use tracing::{debug, warn};

use crate::conflict::{is_within, path_exists};
use crate::copy::{CopyOptions, copy_item, size_of, transfer_error};

/// Move a single item (file, directory or symlink) to `dest`.
///
/// `dest` must not exist. Uses a rename when source and destination share a
/// volume and falls back to copy + delete across devices. A complete copy of
/// the item always survives, at `dest` or at `source`.
///
/// Returns the size of the moved item in bytes.
pub fn move_item(source: &Path, dest: &Path, options: CopyOptions) -> Result<u64, FsError> {
    let metadata = fs::symlink_metadata(source).map_err(|e| FsError::io(source, e))?;

    // rename(2) silently replaces files on Unix.
    if path_exists(dest) {
        return Err(FsError::AlreadyExists {
            path: dest.to_path_buf(),
        });
    }

    if metadata.is_dir() && is_within(source, dest) {
        return Err(FsError::SourceIsAncestor {
            source_path: source.to_path_buf(),
            destination: dest.to_path_buf(),
        });
    }

    let size = size_of(source);

    match fs::rename(source, dest) {
        Ok(()) => Ok(size),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(source = %source.display(), dest = %dest.display(), "cross-device move, copying");
            move_across_devices(source, dest, metadata.is_dir(), options)?;
            Ok(size)
        }
        Err(e) => Err(transfer_error(source, dest, e)),
    }
}

fn move_across_devices(
    source: &Path,
    dest: &Path,
    is_dir: bool,
    options: CopyOptions,
) -> Result<(), FsError> {
    copy_then_remove(source, dest, is_dir, options, |path| {
        if is_dir {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
    })
}

/// Copy `source` to `dest`, then remove `source` with `remove`.
///
/// A failed file removal leaves the source whole, so the copy is dropped and
/// the move fails. A failed tree removal may already have deleted part of the
/// source; the copy is then the only complete one and is kept.
fn copy_then_remove(
    source: &Path,
    dest: &Path,
    is_dir: bool,
    options: CopyOptions,
    remove: impl FnOnce(&Path) -> io::Result<()>,
) -> Result<(), FsError> {
    copy_item(source, dest, options)?;

    let Err(e) = remove(source) else {
        return Ok(());
    };

    if is_dir {
        warn!(
            source = %source.display(),
            dest = %dest.display(),
            error = %e,
            "moved across devices but could not remove the source; leftovers remain"
        );
        return Ok(());
    }

    if let Err(rollback_err) = fs::remove_file(dest) {
        warn!(
            dest = %dest.display(),
            error = %rollback_err,
            "failed to roll back copy after source removal failed"
        );
    }
    Err(FsError::io(source, e))
}
