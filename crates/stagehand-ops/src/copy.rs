//! Copy primitives.

use std::fs::{self, File, FileTimes, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use stagehand_core::FsError;
use tracing::debug;

use crate::conflict::{duplicate_destination, is_within, path_exists};

/// Options for copy operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
    /// Whether to preserve modification/access times.
    pub preserve_timestamps: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            preserve_timestamps: true,
        }
    }
}

/// Copy a file, directory tree or symlink to `dest`.
///
/// `dest` must not exist. On failure any partially written destination is
/// removed. Returns the number of file bytes copied.
pub fn copy_item(source: &Path, dest: &Path, options: CopyOptions) -> Result<u64, FsError> {
    let metadata = fs::symlink_metadata(source).map_err(|e| FsError::io(source, e))?;

    if path_exists(dest) {
        return Err(FsError::AlreadyExists {
            path: dest.to_path_buf(),
        });
    }

    if metadata.is_dir() {
        if is_within(source, dest) {
            return Err(FsError::SourceIsAncestor {
                source_path: source.to_path_buf(),
                destination: dest.to_path_buf(),
            });
        }
        fs::create_dir(dest).map_err(|e| FsError::io(dest, e))?;
        copy_dir_contents(source, dest, options).inspect_err(|_| {
            if let Err(e) = fs::remove_dir_all(dest) {
                debug!(path = %dest.display(), error = %e, "failed to clean up partial copy");
            }
        })
    } else if metadata.file_type().is_symlink() {
        copy_symlink(source, dest).map(|()| 0)
    } else {
        copy_file(source, dest, &metadata, options).inspect_err(|_| {
            let _ = fs::remove_file(dest);
        })
    }
}

/// Copy `path` next to itself under a "- Copy" name.
///
/// Returns the path of the new copy.
pub fn duplicate(path: &Path, options: CopyOptions) -> Result<PathBuf, FsError> {
    let dest = duplicate_destination(path).ok_or_else(|| {
        FsError::invalid_name(path.display().to_string(), "path has no file name")
    })?;
    copy_item(path, &dest, options)?;
    Ok(dest)
}

/// Copy a single regular file, permissions included.
fn copy_file(
    source: &Path,
    dest: &Path,
    metadata: &Metadata,
    options: CopyOptions,
) -> Result<u64, FsError> {
    let bytes = fs::copy(source, dest).map_err(|e| transfer_error(source, dest, e))?;

    if options.preserve_timestamps {
        copy_times(metadata, dest);
    }

    Ok(bytes)
}

/// Recursively copy the entries of `source` into the existing directory `dest`.
fn copy_dir_contents(source: &Path, dest: &Path, options: CopyOptions) -> Result<u64, FsError> {
    let mut total_bytes = 0u64;

    let entries = fs::read_dir(source).map_err(|e| FsError::io(source, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| FsError::io(source, e))?;
        let path = entry.path();
        let dest_path = dest.join(entry.file_name());
        let metadata = fs::symlink_metadata(&path).map_err(|e| FsError::io(&path, e))?;

        if metadata.is_dir() {
            fs::create_dir(&dest_path).map_err(|e| FsError::io(&dest_path, e))?;
            total_bytes += copy_dir_contents(&path, &dest_path, options)?;
        } else if metadata.file_type().is_symlink() {
            copy_symlink(&path, &dest_path)?;
        } else {
            total_bytes += copy_file(&path, &dest_path, &metadata, options)?;
        }
    }

    // Permissions last, so a read-only source directory does not block its own contents.
    let metadata = fs::metadata(source).map_err(|e| FsError::io(source, e))?;
    if let Err(e) = fs::set_permissions(dest, metadata.permissions()) {
        debug!(path = %dest.display(), error = %e, "could not copy directory permissions");
    }
    if options.preserve_timestamps {
        copy_times(&metadata, dest);
    }

    Ok(total_bytes)
}

#[cfg(unix)]
fn copy_symlink(source: &Path, dest: &Path) -> Result<(), FsError> {
    let target = fs::read_link(source).map_err(|e| FsError::io(source, e))?;
    std::os::unix::fs::symlink(&target, dest).map_err(|e| FsError::io(dest, e))
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, dest: &Path) -> Result<(), FsError> {
    fs::copy(source, dest)
        .map(|_| ())
        .map_err(|e| FsError::io(source, e))
}

/// Best-effort copy of modification and access times.
fn copy_times(metadata: &Metadata, dest: &Path) {
    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }

    let result = File::open(dest).and_then(|file| file.set_times(times));
    if let Err(e) = result {
        debug!(path = %dest.display(), error = %e, "could not preserve timestamps");
    }
}

/// Attribute a failed transfer to whichever end is actually missing.
pub(crate) fn transfer_error(source: &Path, dest: &Path, err: io::Error) -> FsError {
    if err.kind() == io::ErrorKind::NotFound && path_exists(source) {
        FsError::io(dest, err)
    } else {
        FsError::io(source, err)
    }
}

/// Get the total size in bytes of a file or directory tree.
pub(crate) fn size_of(path: &Path) -> u64 {
    let Ok(metadata) = fs::symlink_metadata(path) else {
        return 0;
    };
    if !metadata.is_dir() {
        return metadata.len();
    }

    fs::read_dir(path)
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| size_of(&entry.path()))
                .sum()
        })
        .unwrap_or(0)
}
