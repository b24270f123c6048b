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

//! Exists-or-skip file and directory copies used to provision trust material.
//!
//! Layout: `copy.rs` (file/tree copies), `trust.rs` (the provisioning plan), `error.rs`.

pub mod copy;
pub mod error;
pub mod trust;

pub use copy::{CopyOutcome, CopyReport, copy_dir_if_exists, copy_file_if_exists};
pub use error::{FsOpsError, FsOpsResult};
pub use trust::{TrustKind, TrustPlan, TrustTarget};
