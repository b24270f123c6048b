//! Scratch directory and file-tree fixtures.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;
use walkdir::WalkDir;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Create a scratch directory that is removed when dropped.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn temp_dir() -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix("dockhand-")
        .tempdir()
        .context("failed to create scratch directory")
}

/// Write each `(relative path, contents)` pair under `root`, creating parents.
///
/// # Errors
///
/// Returns an error if any directory or file cannot be written.
pub fn write_tree(root: &Path, entries: &[(&str, &[u8])]) -> Result<()> {
    for (relative, contents) in entries {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

/// Entry recorded by [`snapshot_tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    /// A directory.
    Dir,
    /// A regular file and its bytes.
    File(Vec<u8>),
}

/// Capture every entry under `root`, keyed by path relative to `root`.
///
/// The root itself is not included. Two trees are isomorphic with identical
/// contents exactly when their snapshots are equal.
///
/// # Errors
///
/// Returns an error if the tree cannot be walked or a file cannot be read.
pub fn snapshot_tree(root: &Path) -> Result<BTreeMap<PathBuf, TreeEntry>> {
    let mut entries = BTreeMap::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        let relative = entry.path().strip_prefix(root)?.to_path_buf();
        if entry.file_type().is_dir() {
            entries.insert(relative, TreeEntry::Dir);
        } else {
            let bytes = fs::read(entry.path())
                .with_context(|| format!("failed to read {}", entry.path().display()))?;
            entries.insert(relative, TreeEntry::File(bytes));
        }
    }
    Ok(entries)
}

/// Write an executable shell script named `name` into `dir`.
///
/// # Errors
///
/// Returns an error if the script cannot be written or made executable.
pub fn write_script(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))
        .with_context(|| format!("failed to write {}", path.display()))?;
    #[cfg(unix)]
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("failed to chmod {}", path.display()))?;
    Ok(path)
}
