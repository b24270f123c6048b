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

//! Static locations and environment-derived settings for the dockhand bootstrap.
//!
//! Layout: `paths.rs` (fixed node and trust locations), `model.rs` (typed
//! selectors), `settings.rs` (`RuntimeSettings` loading), `error.rs`.

pub mod error;
pub mod model;
pub mod paths;
pub mod settings;

pub use error::{ConfigError, ConfigResult};
pub use model::{LogFormat, MAX_BUILD_LOGLEVEL, PanicBehavior, ProfileMode};
pub use paths::{NodePaths, TrustPaths};
pub use settings::RuntimeSettings;
