//! Panic behaviour hook selected by `DOCKHAND_ON_PANIC`.
//!
//! # Design
//! - Every escaped panic is logged through `tracing` before anything else happens.
//! - `crash` aborts after logging so a supervisor sees a hard failure instead of
//!   an unwinding thread that may leave the build half-finished.
//! - Dropping the guard restores the default hook, except while unwinding.

use std::any::Any;
use std::panic::{self, PanicHookInfo};
use std::thread;

use dockhand_config::PanicBehavior;
use tracing::error;

use crate::init::build_sha;

/// Restores the default panic hook when dropped.
#[must_use = "dropping the guard uninstalls the panic hook"]
pub struct PanicHookGuard {
    behavior: PanicBehavior,
}

impl PanicHookGuard {
    /// Behaviour this hook was installed with.
    #[must_use]
    pub const fn behavior(&self) -> PanicBehavior {
        self.behavior
    }
}

impl Drop for PanicHookGuard {
    fn drop(&mut self) {
        // The hook cannot be replaced while unwinding; leave it for the panic in flight.
        if thread::panicking() {
            return;
        }
        drop(panic::take_hook());
    }
}

/// Install the process panic hook.
pub fn install_panic_hook(behavior: PanicBehavior) -> PanicHookGuard {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
        let location = info
            .location()
            .map(|location| format!("{}:{}", location.file(), location.line()));
        error!(
            message = %panic_message(info.payload()),
            location = location.as_deref().unwrap_or("unknown"),
            build_sha = build_sha(),
            "unrecoverable panic"
        );
        previous(info);
        if behavior == PanicBehavior::Crash {
            std::process::abort();
        }
    }));
    PanicHookGuard { behavior }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
