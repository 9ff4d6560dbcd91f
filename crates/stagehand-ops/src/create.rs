//! File and directory creation.

use std::fs::{self, File};
use std::path::Path;

use stagehand_core::FsError;
use tracing::debug;

use crate::rename::validate_filename;

fn check_name(path: &Path) -> Result<(), FsError> {
    match path.file_name() {
        Some(name) => validate_filename(&name.to_string_lossy()),
        None => Err(FsError::invalid_name(
            path.display().to_string(),
            "path has no file name",
        )),
    }
}

/// Create an empty file at `path`.
///
/// Fails with [`FsError::AlreadyExists`] if anything occupies the path. The
/// parent directory must exist.
pub fn create_file(path: &Path) -> Result<(), FsError> {
    check_name(path)?;
    File::create_new(path).map_err(|e| FsError::io(path, e))?;
    debug!(path = %path.display(), "created file");
    Ok(())
}

/// Create a directory at `path`.
///
/// Fails with [`FsError::AlreadyExists`] if anything occupies the path.
pub fn create_directory(path: &Path) -> Result<(), FsError> {
    check_name(path)?;
    fs::create_dir(path).map_err(|e| FsError::io(path, e))?;
    debug!(path = %path.display(), "created directory");
    Ok(())
}
