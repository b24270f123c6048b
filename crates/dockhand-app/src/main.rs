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

//! Binary entrypoint: one executable, five build-step tools selected by
//! invocation name.

use std::process::ExitCode;

/// Bootstraps the process and runs the command selected by `argv[0]`.
fn main() -> ExitCode {
    dockhand_app::run()
}
