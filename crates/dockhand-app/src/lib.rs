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
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Startup orchestration for the dockhand multi-mode build executable.
//!
//! Layout:
//! - `bootstrap.rs`: the startup sequence and exit-code mapping
//! - `reexec.rs`: named helper trampoline checked before anything else
//! - `diagnostics.rs`: best-effort node state reporting
//! - `watchdog.rs`: SIGTERM fail-fast listener
//! - `registry.rs`: invocation name to build mode dispatch
//! - `commands/`: per-mode commands, global flags and the step runner

pub mod bootstrap;
pub mod commands;
pub mod diagnostics;
pub mod error;
pub mod reexec;
pub mod registry;
pub mod watchdog;

pub use bootstrap::run;
pub use error::{AppError, AppResult, FAILURE_EXIT_CODE};
pub use registry::{BuildMode, RegistryError, command_for};
