//! # Design
//!
//! - Provide structured, constant-message errors for copy operations.
//! - Capture the operation and path so failures are reproducible in tests.
//! - Preserve the underlying IO error verbatim as the source.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for filesystem operations.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// Errors produced while provisioning files.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// IO failures while interacting with the filesystem.
    #[error("fsops io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Directory traversal failures, including symlink loops.
    #[error("fsops walkdir failure")]
    Walkdir {
        /// Operation that triggered the traversal failure.
        operation: &'static str,
        /// Path being visited when the traversal failed.
        path: PathBuf,
        /// Underlying walkdir error.
        source: walkdir::Error,
    },
    /// A trust provisioning step failed.
    #[error("trust provisioning failed")]
    Provision {
        /// Label of the provisioning target.
        target: &'static str,
        /// Failure reported by the copy.
        source: Box<FsOpsError>,
    },
}

impl FsOpsError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn walkdir(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: walkdir::Error,
    ) -> Self {
        Self::Walkdir {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn provision(target: &'static str, source: Self) -> Self {
        Self::Provision {
            target,
            source: Box::new(source),
        }
    }

    /// Operation identifier of the innermost failure.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Io { operation, .. } | Self::Walkdir { operation, .. } => *operation,
            Self::Provision { source, .. } => source.operation(),
        }
    }

    /// Path involved in the innermost failure.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Walkdir { path, .. } => path,
            Self::Provision { source, .. } => source.path(),
        }
    }

    /// The IO error at the root of this failure, absent for symlink loops.
    #[must_use]
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Walkdir { source, .. } => source.io_error(),
            Self::Provision { source, .. } => source.io_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn fsops_error_helpers_build_variants() {
        let io_err = FsOpsError::io("copy_file.open", "ca.crt", io::Error::other("io"));
        assert!(matches!(io_err, FsOpsError::Io { .. }));
        assert_eq!(io_err.to_string(), "fsops io failure");
        assert!(io_err.source().is_some());

        let wrapped = FsOpsError::provision("cluster CA cert", io_err);
        assert_eq!(wrapped.to_string(), "trust provisioning failed");
        assert_eq!(
            wrapped.io_error().map(ToString::to_string).as_deref(),
            Some("io")
        );
        assert_eq!(wrapped.operation(), "copy_file.open");
        assert_eq!(wrapped.path(), Path::new("ca.crt"));
        let inner = wrapped.source().map(ToString::to_string);
        assert_eq!(inner.as_deref(), Some("fsops io failure"));
    }
}
