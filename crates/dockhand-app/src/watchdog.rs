//! SIGTERM watchdog.
//!
//! In a build container a terminate request means the build was preempted from
//! outside, so the process exits non-zero at once: no graceful shutdown, no
//! cleanup beyond what the kernel does. Only SIGTERM is intercepted.

use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinHandle;

use crate::error::{AppError, AppResult, FAILURE_EXIT_CODE};

/// Line written to stdout when the signal arrives.
pub const TERMINATE_MESSAGE: &str = "Error: received unexpected terminate signal";

/// Install the watchdog; `on_signal` runs after the message is written.
///
/// Production passes [`terminate_process`]. Must be called from within a
/// tokio runtime. The returned task is never cancelled and ends only with the
/// process.
///
/// # Errors
///
/// Returns `AppError::Watchdog` if the signal handler cannot be registered.
pub fn install_with<F>(on_signal: F) -> AppResult<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    let mut terminate =
        signal(SignalKind::terminate()).map_err(|source| AppError::Watchdog { source })?;
    Ok(tokio::spawn(async move {
        if terminate.recv().await.is_some() {
            println!("{TERMINATE_MESSAGE}");
            on_signal();
        }
    }))
}

/// Exit immediately with the failure status, skipping destructors.
pub fn terminate_process() {
    std::process::exit(i32::from(FAILURE_EXIT_CODE));
}
