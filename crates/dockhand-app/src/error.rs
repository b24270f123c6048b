//! # Design
//!
//! - Centralize application-level errors for bootstrap wiring.
//! - Keep error messages constant while carrying context fields for debugging.

use std::error::Error as StdError;
use std::io;

use thiserror::Error;

/// Exit status for every failure path, including watchdog terminations.
pub const FAILURE_EXIT_CODE: u8 = 1;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Building the async runtime failed.
    #[error("runtime construction failed")]
    Runtime {
        /// Operation identifier.
        operation: &'static str,
        /// Source IO error.
        source: io::Error,
    },
    /// Registering the termination listener failed.
    #[error("termination watchdog installation failed")]
    Watchdog {
        /// Source IO error.
        source: io::Error,
    },
    /// A re-exec helper name was registered twice.
    #[error("re-exec helper already registered")]
    DuplicateHelper {
        /// Helper name.
        name: String,
    },
}

/// Render an error and all of its sources on one line.
#[must_use]
pub fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        message.push_str(": ");
        message.push_str(&source.to_string());
        current = source.source();
    }
    message
}
