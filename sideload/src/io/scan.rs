//! Recursive discovery of package files.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Lazily walk `root` depth-first and yield every file whose name ends with `suffix`.
///
/// Order is whatever the filesystem returns; each call re-walks from scratch.
/// Symlinked directories are not descended into, a symlink to a file counts as
/// a file. Unreadable entries are logged and skipped.
pub fn package_files(root: &Path, suffix: impl Into<String>) -> impl Iterator<Item = PathBuf> {
    let suffix = suffix.into();
    debug!(root = %root.display(), suffix = %suffix, "scanning for packages");
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(err = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(is_file_like)
        .filter(move |entry| name_has_suffix(entry, &suffix))
        .map(DirEntry::into_path)
}

fn is_file_like(entry: &DirEntry) -> bool {
    if entry.file_type().is_dir() {
        return false;
    }
    !(entry.path_is_symlink() && entry.path().is_dir())
}

fn name_has_suffix(entry: &DirEntry, suffix: &str) -> bool {
    entry
        .file_name()
        .as_encoded_bytes()
        .ends_with(suffix.as_bytes())
}
