//! Process-wide span carrying the invocation identity.

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Guard that keeps the application-level span entered for the lifetime of the process.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the application-level span for the lifetime of the guard.
    #[must_use]
    pub fn new(mode: impl Into<String>, invocation_id: impl Into<String>) -> Self {
        let mode = mode.into();
        let invocation_id = invocation_id.into();
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "app",
            mode = %mode,
            build_sha = %build_sha(),
            invocation_id = %invocation_id
        )));
        let guard = span.enter();
        Self { _guard: guard }
    }
}

/// Record the selected mode on the active span.
pub fn record_app_mode(mode: &str) {
    Span::current().record("mode", tracing::field::display(mode));
}
