//! Rename operation.

use std::fs;
use std::path::{Path, PathBuf};

use stagehand_core::FsError;
use tracing::debug;

use crate::conflict::path_exists;

/// Rename `path` to `new_name` within its parent directory.
///
/// Never overwrites. Returns the new path.
pub fn rename(path: &Path, new_name: &str) -> Result<PathBuf, FsError> {
    validate_filename(new_name)?;

    let parent = path.parent().unwrap_or(Path::new(""));
    let new_path = parent.join(new_name);
    rename_to(path, &new_path)?;
    Ok(new_path)
}

/// Rename `from` to the full path `to`, refusing to overwrite.
pub(crate) fn rename_to(from: &Path, to: &Path) -> Result<(), FsError> {
    if !path_exists(from) {
        return Err(FsError::NotFound {
            path: from.to_path_buf(),
        });
    }
    if from == to {
        return Ok(());
    }
    if path_exists(to) && !same_entry(from, to) {
        return Err(FsError::AlreadyExists {
            path: to.to_path_buf(),
        });
    }

    fs::rename(from, to).map_err(|e| FsError::io(from, e))?;
    debug!(from = %from.display(), to = %to.display(), "renamed");
    Ok(())
}

/// Case-only renames on case-insensitive filesystems resolve to the same entry.
fn same_entry(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Validate a filename for cross-platform compatibility.
pub fn validate_filename(name: &str) -> Result<(), FsError> {
    let invalid = |reason: &str| -> Result<(), FsError> {
        Err(FsError::invalid_name(name, reason))
    };

    if name.is_empty() {
        return invalid("name cannot be empty");
    }

    if name.len() > 255 {
        return invalid("name is too long (max 255 bytes)");
    }

    if name == "." || name == ".." {
        return invalid("'.' and '..' are reserved names");
    }

    for c in ['/', '\0'] {
        if name.contains(c) {
            return invalid(&format!("name cannot contain {c:?}"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        for c in ['\\', ':', '*', '?', '"', '<', '>', '|'] {
            if name.contains(c) {
                return invalid(&format!("name cannot contain {c:?}"));
            }
        }

        let reserved = [
            "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
            "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
        ];
        let upper = name.to_uppercase();
        let base = upper.split('.').next().unwrap_or("");
        if reserved.contains(&base) {
            return invalid("reserved device name");
        }
    }

    if name.starts_with(' ') || name.ends_with(' ') {
        return invalid("name cannot start or end with spaces");
    }

    if name.ends_with('.') {
        return invalid("name cannot end with a dot");
    }

    Ok(())
}
