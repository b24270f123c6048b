//! Exists-or-skip copies for single files and directory trees.
//!
//! # Design
//! - A missing source is a successful no-op, never an error.
//! - Destination files are truncated and rewritten; file modes and timestamps
//!   are not carried over. Only created directories take the source's mode.
//! - Tree copies stop at the first failing entry and leave earlier entries in place.

use std::fs::{self, File, Metadata};
use std::io;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{FsOpsError, FsOpsResult};

/// Result of a copy that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The source did not exist; nothing was touched.
    Skipped,
    /// The source was copied.
    Completed(CopyReport),
}

impl CopyOutcome {
    /// Whether the source was absent.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

/// Counters describing a completed copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Files written.
    pub files: u64,
    /// Directories visited, including the root of a tree copy.
    pub directories: u64,
    /// Bytes written across all files.
    pub bytes: u64,
}

/// Copy `src` to `dst` if `src` exists.
///
/// An existing `dst` is overwritten in place; its previous permission bits are
/// left as they were and none of the source's attributes are copied.
///
/// # Errors
///
/// Returns the first IO failure from opening, creating, copying or syncing.
pub fn copy_file_if_exists(src: &Path, dst: &Path) -> FsOpsResult<CopyOutcome> {
    if source_metadata(src, "copy_file.stat")?.is_none() {
        return Ok(CopyOutcome::Skipped);
    }
    let mut report = CopyReport::default();
    copy_file(src, dst, &mut report)?;
    Ok(CopyOutcome::Completed(report))
}

/// Recursively copy the directory `src` into `dst` if `src` exists.
///
/// Entries are visited depth first in file-name order and symlinks are
/// followed. Entries already present in `dst` with matching names are
/// overwritten; unrelated entries are left alone. Entries that vanish during
/// the walk are skipped.
///
/// # Errors
///
/// Returns the first failure encountered, including a symlink that loops back
/// to an ancestor. Entries copied before the failure remain in `dst`.
pub fn copy_dir_if_exists(src: &Path, dst: &Path) -> FsOpsResult<CopyOutcome> {
    if source_metadata(src, "copy_dir.stat")?.is_none() {
        return Ok(CopyOutcome::Skipped);
    }
    let mut report = CopyReport::default();
    copy_dir(src, dst, &mut report)?;
    Ok(CopyOutcome::Completed(report))
}

fn source_metadata(src: &Path, operation: &'static str) -> FsOpsResult<Option<Metadata>> {
    match fs::metadata(src) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(FsOpsError::io(operation, src, err)),
    }
}

fn copy_file(src: &Path, dst: &Path, report: &mut CopyReport) -> FsOpsResult<()> {
    let mut input = File::open(src).map_err(|err| FsOpsError::io("copy_file.open", src, err))?;
    let mut output =
        File::create(dst).map_err(|err| FsOpsError::io("copy_file.create", dst, err))?;
    let bytes =
        io::copy(&mut input, &mut output).map_err(|err| FsOpsError::io("copy_file.copy", dst, err))?;
    // Close errors are not reported by `File`; a successful sync stands in for them.
    output
        .sync_all()
        .map_err(|err| FsOpsError::io("copy_file.sync", dst, err))?;

    report.files += 1;
    report.bytes += bytes;
    debug!(src = %src.display(), dst = %dst.display(), bytes, "copied file");
    Ok(())
}

fn copy_dir(src: &Path, dst: &Path, report: &mut CopyReport) -> FsOpsResult<()> {
    // Following links lets mounted `..data` style links resolve; walkdir
    // reports a link back to an ancestor as a loop instead of descending.
    for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if is_vanished(&err) => continue,
            Err(err) => {
                let path = err.path().unwrap_or(src).to_path_buf();
                return Err(FsOpsError::walkdir("copy_dir.walk", path, err));
            }
        };
        let relative = entry.path().strip_prefix(src).map_err(|_| {
            FsOpsError::io(
                "copy_dir.relative",
                entry.path(),
                io::Error::new(io::ErrorKind::InvalidInput, "entry outside source tree"),
            )
        })?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            let metadata = entry
                .metadata()
                .map_err(|err| FsOpsError::walkdir("copy_dir.stat", entry.path(), err))?;
            create_dir_like(&target, &metadata)?;
            report.directories += 1;
        } else {
            copy_file(entry.path(), &target, report)?;
        }
    }
    Ok(())
}

fn is_vanished(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|io_err| io_err.kind() == io::ErrorKind::NotFound)
}

#[cfg(unix)]
fn create_dir_like(dst: &Path, metadata: &Metadata) -> FsOpsResult<()> {
    use std::os::unix::fs::{DirBuilderExt, PermissionsExt};

    fs::DirBuilder::new()
        .recursive(true)
        .mode(metadata.permissions().mode() & 0o7777)
        .create(dst)
        .map_err(|err| FsOpsError::io("copy_dir.create_dir", dst, err))
}

#[cfg(not(unix))]
fn create_dir_like(dst: &Path, _metadata: &Metadata) -> FsOpsResult<()> {
    fs::create_dir_all(dst).map_err(|err| FsOpsError::io("copy_dir.create_dir", dst, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use dockhand_test_support::fixtures::{snapshot_tree, temp_dir, write_tree};

    #[test]
    fn missing_file_source_is_skipped_and_destination_untouched() -> Result<()> {
        let temp = temp_dir()?;
        let dst = temp.path().join("dst.crt");
        fs::write(&dst, b"previous")?;

        let outcome = copy_file_if_exists(&temp.path().join("absent.crt"), &dst)?;
        assert!(outcome.is_skipped());
        assert_eq!(fs::read(&dst)?, b"previous");

        let untouched = temp.path().join("never-created.crt");
        copy_file_if_exists(&temp.path().join("absent.crt"), &untouched)?;
        assert!(!untouched.exists());
        Ok(())
    }

    #[test]
    fn missing_dir_source_is_skipped_and_destination_not_created() -> Result<()> {
        let temp = temp_dir()?;
        let dst = temp.path().join("certs.d");
        let outcome = copy_dir_if_exists(&temp.path().join("absent"), &dst)?;
        assert_eq!(outcome, CopyOutcome::Skipped);
        assert!(!dst.exists());
        Ok(())
    }

    #[test]
    fn file_copy_overwrites_longer_destination_exactly() -> Result<()> {
        let temp = temp_dir()?;
        let src = temp.path().join("ca.crt");
        let dst = temp.path().join("cluster.crt");
        fs::write(&src, b"X")?;
        fs::write(&dst, b"a much longer previous certificate body")?;

        let outcome = copy_file_if_exists(&src, &dst)?;
        assert_eq!(
            outcome,
            CopyOutcome::Completed(CopyReport {
                files: 1,
                directories: 0,
                bytes: 1,
            })
        );
        assert_eq!(fs::read(&dst)?, b"X");
        Ok(())
    }

    #[test]
    fn file_copy_into_missing_directory_fails_with_create_operation() -> Result<()> {
        let temp = temp_dir()?;
        let src = temp.path().join("ca.crt");
        fs::write(&src, b"X")?;
        let dst = temp.path().join("no-such-dir").join("cluster.crt");

        let Err(err) = copy_file_if_exists(&src, &dst) else {
            return Err(anyhow!("expected create failure"));
        };
        assert!(matches!(
            err,
            FsOpsError::Io {
                operation: "copy_file.create",
                ..
            }
        ));
        assert_eq!(
            err.io_error().map(io::Error::kind),
            Some(io::ErrorKind::NotFound)
        );
        Ok(())
    }

    #[test]
    fn dir_copy_mirrors_nested_tree() -> Result<()> {
        let temp = temp_dir()?;
        let src = temp.path().join("src");
        write_tree(&src, &[("a/b.pem", b"bee"), ("c.pem", b"sea")])?;
        let dst = temp.path().join("out").join("certs.d");

        let outcome = copy_dir_if_exists(&src, &dst)?;
        assert_eq!(
            outcome,
            CopyOutcome::Completed(CopyReport {
                files: 2,
                directories: 2,
                bytes: 6,
            })
        );
        assert_eq!(snapshot_tree(&src)?, snapshot_tree(&dst)?);
        Ok(())
    }

    #[test]
    fn dir_copy_keeps_unrelated_destination_entries() -> Result<()> {
        let temp = temp_dir()?;
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        write_tree(&src, &[("registry/ca.crt", b"new")])?;
        write_tree(&dst, &[("registry/ca.crt", b"old"), ("other/ca.crt", b"keep")])?;

        copy_dir_if_exists(&src, &dst)?;
        assert_eq!(fs::read(dst.join("registry/ca.crt"))?, b"new");
        assert_eq!(fs::read(dst.join("other/ca.crt"))?, b"keep");
        Ok(())
    }

    #[test]
    fn copies_are_idempotent() -> Result<()> {
        let temp = temp_dir()?;
        let src = temp.path().join("src");
        write_tree(&src, &[("a/b.pem", b"b"), ("c.pem", b"c")])?;
        let dst = temp.path().join("dst");

        copy_dir_if_exists(&src, &dst)?;
        let first = snapshot_tree(&dst)?;
        copy_dir_if_exists(&src, &dst)?;
        assert_eq!(first, snapshot_tree(&dst)?);

        let file_dst = temp.path().join("single.pem");
        copy_file_if_exists(&src.join("c.pem"), &file_dst)?;
        copy_file_if_exists(&src.join("c.pem"), &file_dst)?;
        assert_eq!(fs::read(&file_dst)?, b"c");
        Ok(())
    }

    #[test]
    fn dir_copy_stops_at_first_failure_without_rollback() -> Result<()> {
        let temp = temp_dir()?;
        let src = temp.path().join("src");
        write_tree(&src, &[("a.pem", b"a"), ("b/inner.pem", b"b"), ("c.pem", b"c")])?;
        let dst = temp.path().join("dst");
        // A regular file where the `b` directory must go makes the second entry fail.
        write_tree(&dst, &[("b", b"blocker")])?;

        let Err(err) = copy_dir_if_exists(&src, &dst) else {
            return Err(anyhow!("expected the blocked directory to fail"));
        };
        assert!(matches!(
            err,
            FsOpsError::Io {
                operation: "copy_dir.create_dir",
                ..
            }
        ));
        assert_eq!(fs::read(dst.join("a.pem"))?, b"a");
        assert!(!dst.join("c.pem").exists(), "later siblings are not copied");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn dir_copy_creates_directories_with_source_mode() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let temp = temp_dir()?;
        let src = temp.path().join("src");
        write_tree(&src, &[("registry/ca.crt", b"x")])?;
        fs::set_permissions(src.join("registry"), fs::Permissions::from_mode(0o700))?;
        let dst = temp.path().join("dst");

        copy_dir_if_exists(&src, &dst)?;
        let mode = fs::metadata(dst.join("registry"))?.permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn dir_copy_follows_symlinked_entries() -> Result<()> {
        let temp = temp_dir()?;
        let src = temp.path().join("src");
        write_tree(&src, &[("..data/registry/ca.crt", b"linked")])?;
        std::os::unix::fs::symlink(src.join("..data/registry"), src.join("registry"))?;
        let dst = temp.path().join("dst");

        copy_dir_if_exists(&src, &dst)?;
        assert_eq!(fs::read(dst.join("registry/ca.crt"))?, b"linked");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn dir_copy_stops_at_a_symlink_loop_without_descending() -> Result<()> {
        let temp = temp_dir()?;
        let src = temp.path().join("src");
        write_tree(&src, &[("ca.pem", b"ca")])?;
        std::os::unix::fs::symlink(&src, src.join("loop"))?;
        let dst = temp.path().join("dst");

        let Err(err) = copy_dir_if_exists(&src, &dst) else {
            return Err(anyhow!("expected the loop to be reported"));
        };
        let FsOpsError::Walkdir { operation, source, .. } = &err else {
            return Err(anyhow!("expected a traversal error, got {err:?}"));
        };
        assert_eq!(*operation, "copy_dir.walk");
        assert!(source.loop_ancestor().is_some());
        assert_eq!(fs::read(dst.join("ca.pem"))?, b"ca");
        assert!(!dst.join("loop").exists(), "the loop is never copied");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn dir_copy_skips_dangling_symlinks() -> Result<()> {
        let temp = temp_dir()?;
        let src = temp.path().join("src");
        write_tree(&src, &[("ca.pem", b"ca")])?;
        std::os::unix::fs::symlink(temp.path().join("gone"), src.join("dangling"))?;
        let dst = temp.path().join("dst");

        copy_dir_if_exists(&src, &dst)?;
        assert_eq!(fs::read(dst.join("ca.pem"))?, b"ca");
        assert!(!dst.join("dangling").exists());
        Ok(())
    }
}
