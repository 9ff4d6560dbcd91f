//! Deletion, to the OS trash or permanently.

use std::fs;
use std::path::Path;

use stagehand_core::FsError;
use tracing::debug;

/// Delete `path`, sending it to the trash when `use_trash` is set.
///
/// Directories are removed recursively. Symlinks are removed, never followed.
/// Returns the number of bytes the item occupied.
pub fn delete(path: &Path, use_trash: bool) -> Result<u64, FsError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| FsError::io(path, e))?;
    let size = crate::copy::size_of(path);

    if use_trash {
        trash::delete(path).map_err(|e| FsError::Trash {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "moved to trash");
    } else {
        if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
        .map_err(|e| FsError::io(path, e))?;
        debug!(path = %path.display(), "deleted permanently");
    }

    Ok(size)
}

/// Remove a path without trashing it: a file, a symlink, or a whole tree.
pub(crate) fn remove_path(path: &Path) -> Result<(), FsError> {
    delete(path, false).map(|_| ())
}

/// Remove `path` only if it is an empty directory.
pub(crate) fn remove_empty_dir(path: &Path) -> Result<(), FsError> {
    fs::remove_dir(path).map_err(|e| FsError::io(path, e))
}
