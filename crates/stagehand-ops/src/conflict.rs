//! Destination naming that never overwrites an existing entry.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix appended by [`duplicate_destination`].
const COPY_LABEL: &str = " - Copy";

/// Check whether anything occupies `path`, without following symlinks.
///
/// A dangling symlink counts as occupied.
pub fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Split a file name into `(stem, extension)`, the extension including its dot.
///
/// Leading-dot names such as `.bashrc` have no extension.
pub fn split_name(name: &OsStr) -> (OsString, OsString) {
    let as_path = Path::new(name);
    let stem = as_path
        .file_stem()
        .map(OsStr::to_os_string)
        .unwrap_or_else(|| name.to_os_string());
    let mut extension = OsString::new();
    if let Some(ext) = as_path.extension() {
        extension.push(".");
        extension.push(ext);
    }
    (stem, extension)
}

fn compose(stem: &OsStr, middle: &str, extension: &OsStr) -> OsString {
    let mut name = stem.to_os_string();
    name.push(middle);
    name.push(extension);
    name
}

/// Build the `n`th conflict name: `file.txt` becomes `file (n).txt`.
pub fn numbered_name(name: &OsStr, n: u64) -> OsString {
    let (stem, extension) = split_name(name);
    compose(&stem, &format!(" ({n})"), &extension)
}

/// Pick the first free path for `name` inside `dir`.
///
/// Tries `dir/name`, then `name (1)`, `name (2)`, ... Every call starts its
/// own search from 1.
pub fn resolve_destination(dir: &Path, name: &OsStr) -> PathBuf {
    let candidate = dir.join(name);
    if !path_exists(&candidate) {
        return candidate;
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = dir.join(numbered_name(name, counter));
        if !path_exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Pick a free sibling path for a duplicate of `path`.
///
/// For `report.pdf` tries `report - Copy.pdf`, then `report - Copy (1).pdf`, ...
/// Returns `None` for paths without a file name.
pub fn duplicate_destination(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let dir = path.parent().unwrap_or(Path::new(""));
    let (stem, extension) = split_name(name);

    let candidate = dir.join(compose(&stem, COPY_LABEL, &extension));
    if !path_exists(&candidate) {
        return Some(candidate);
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = dir.join(compose(
            &stem,
            &format!("{COPY_LABEL} ({counter})"),
            &extension,
        ));
        if !path_exists(&candidate) {
            return Some(candidate);
        }
        counter += 1;
    }
}

/// Check whether `destination` lies inside the directory `source`.
///
/// Compares canonical forms where they can be resolved, so `a/../a` style
/// aliases are caught too.
pub fn is_within(source: &Path, destination: &Path) -> bool {
    if destination.starts_with(source) {
        return true;
    }

    let Ok(source) = source.canonicalize() else {
        return false;
    };
    let resolved = match (destination.parent(), destination.file_name()) {
        (Some(parent), Some(name)) => parent.canonicalize().map(|p| p.join(name)),
        _ => destination.canonicalize(),
    };
    resolved.is_ok_and(|dest| dest.starts_with(&source))
}
