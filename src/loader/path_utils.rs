// src/loader/path_utils.rs

//! Utility functions for program paths.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// True if `path`'s extension is exactly `ext` (case-sensitive, no dot).
///
/// A file named just `.{ext}` also counts, although `Path::extension`
/// treats it as a stem with no extension.
pub fn has_extension(path: &Path, ext: &str) -> bool {
    if path.extension() == Some(OsStr::new(ext)) {
        return true;
    }
    path.file_name()
        .and_then(OsStr::to_str)
        .and_then(|name| name.strip_prefix('.'))
        == Some(ext)
}

/// Split an event path into its directory and base name.
///
/// A bare file name yields an empty directory, which joins back to the same
/// relative path. Returns `None` for paths without a UTF-8 final component
/// (e.g. `..` or non-UTF-8 names), since programs are registered by name.
pub fn split_program_path(path: &Path) -> Option<(PathBuf, String)> {
    let name = path.file_name()?.to_str()?.to_string();
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Some((dir, name))
}
