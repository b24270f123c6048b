#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

//! Process-level observability hooks for dockhand.
//!
//! Layout: `init.rs` (subscriber setup), `context.rs` (process span),
//! `panic.rs` (panic behaviour hook), `profile.rs` (exit-time resource report),
//! `error.rs`.

pub mod context;
pub mod error;
pub mod init;
pub mod panic;
pub mod profile;

pub use context::{GlobalContextGuard, record_app_mode};
pub use dockhand_config::LogFormat;
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LoggingConfig, build_sha, init_logging};
pub use panic::{PanicHookGuard, install_panic_hook};
pub use profile::{ProfileGuard, ProfileReport};
