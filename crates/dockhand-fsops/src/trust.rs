//! Trust provisioning plan: which certificate material lands where.
//!
//! # Design
//! - The plan is plain data so the bootstrap can log and fail per target.
//! - Targets run in order; the first failure stops the plan.

use std::path::PathBuf;

use dockhand_config::TrustPaths;
use tracing::info;

use crate::copy::{CopyOutcome, copy_dir_if_exists, copy_file_if_exists};
use crate::error::{FsOpsError, FsOpsResult};

/// Label of the cluster CA target.
pub const CLUSTER_CA_LABEL: &str = "cluster CA cert";
/// Label of the runtime registry CA target.
pub const SERVICE_CA_LABEL: &str = "service CA cert";

/// Shape of a provisioning source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustKind {
    /// A single certificate file.
    File,
    /// A directory tree of certificates.
    Directory,
}

/// One copy performed during trust provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustTarget {
    /// Human-readable label used in diagnostics.
    pub label: &'static str,
    /// Whether the source is a file or a tree.
    pub kind: TrustKind,
    /// Mounted source path.
    pub source: PathBuf,
    /// Destination path expected by the runtime.
    pub destination: PathBuf,
}

impl TrustTarget {
    /// Perform this target's copy.
    ///
    /// # Errors
    ///
    /// Returns `FsOpsError::Provision` wrapping the copy failure.
    pub fn apply(&self) -> FsOpsResult<CopyOutcome> {
        let result = match self.kind {
            TrustKind::File => copy_file_if_exists(&self.source, &self.destination),
            TrustKind::Directory => copy_dir_if_exists(&self.source, &self.destination),
        };
        let outcome = result.map_err(|err| FsOpsError::provision(self.label, err))?;
        match outcome {
            CopyOutcome::Skipped => info!(
                target_label = self.label,
                source = %self.source.display(),
                "trust source absent; skipping"
            ),
            CopyOutcome::Completed(report) => info!(
                target_label = self.label,
                destination = %self.destination.display(),
                files = report.files,
                bytes = report.bytes,
                "trust material provisioned"
            ),
        }
        Ok(outcome)
    }
}

/// Ordered list of trust provisioning targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustPlan {
    targets: Vec<TrustTarget>,
}

impl TrustPlan {
    /// The cluster CA file followed by the runtime registry CA tree.
    #[must_use]
    pub fn standard(paths: &TrustPaths) -> Self {
        Self {
            targets: vec![
                TrustTarget {
                    label: CLUSTER_CA_LABEL,
                    kind: TrustKind::File,
                    source: paths.cluster_ca_source(),
                    destination: paths.cluster_ca_destination(),
                },
                TrustTarget {
                    label: SERVICE_CA_LABEL,
                    kind: TrustKind::Directory,
                    source: paths.runtime_ca_source(),
                    destination: paths.runtime_ca_destination(),
                },
            ],
        }
    }

    /// Targets in execution order.
    #[must_use]
    pub fn targets(&self) -> &[TrustTarget] {
        &self.targets
    }

    /// Apply every target in order.
    ///
    /// # Errors
    ///
    /// Returns the first failing target's error; later targets are not attempted.
    pub fn apply(&self) -> FsOpsResult<Vec<CopyOutcome>> {
        self.targets.iter().map(TrustTarget::apply).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use dockhand_test_support::fixtures::{snapshot_tree, temp_dir, write_tree};
    use std::fs;

    fn prepared_paths(root: &std::path::Path) -> Result<TrustPaths> {
        let paths = TrustPaths::rooted_at(root);
        fs::create_dir_all(&paths.tls_cert_root)?;
        Ok(paths)
    }

    #[test]
    fn standard_plan_orders_cluster_before_runtime() {
        let plan = TrustPlan::standard(&TrustPaths::default());
        let labels: Vec<_> = plan.targets().iter().map(|target| target.label).collect();
        assert_eq!(labels, vec![CLUSTER_CA_LABEL, SERVICE_CA_LABEL]);
        assert_eq!(plan.targets()[0].kind, TrustKind::File);
        assert_eq!(plan.targets()[1].kind, TrustKind::Directory);
    }

    #[test]
    fn cluster_ca_lands_in_tls_root() -> Result<()> {
        let temp = temp_dir()?;
        let paths = prepared_paths(temp.path())?;
        write_tree(&paths.secret_mount, &[("ca.crt", b"X")])?;

        let outcomes = TrustPlan::standard(&paths).apply()?;
        assert!(!outcomes[0].is_skipped());
        assert!(outcomes[1].is_skipped());
        assert_eq!(fs::read(paths.cluster_ca_destination())?, b"X");
        Ok(())
    }

    #[test]
    fn runtime_ca_tree_is_mirrored() -> Result<()> {
        let temp = temp_dir()?;
        let paths = prepared_paths(temp.path())?;
        write_tree(
            &paths.runtime_ca_source(),
            &[("a/b.pem", b"bee"), ("c.pem", b"sea")],
        )?;

        TrustPlan::standard(&paths).apply()?;
        assert_eq!(
            snapshot_tree(&paths.runtime_ca_source())?,
            snapshot_tree(&paths.runtime_ca_destination())?
        );
        Ok(())
    }

    #[test]
    fn first_failure_stops_the_plan() -> Result<()> {
        let temp = temp_dir()?;
        // No TLS root: the cluster CA copy cannot create its destination.
        let paths = TrustPaths::rooted_at(temp.path());
        write_tree(&paths.secret_mount, &[("ca.crt", b"X")])?;
        write_tree(&paths.runtime_ca_source(), &[("c.pem", b"c")])?;

        let Err(err) = TrustPlan::standard(&paths).apply() else {
            return Err(anyhow!("expected cluster CA failure"));
        };
        assert!(matches!(
            err,
            FsOpsError::Provision {
                target: CLUSTER_CA_LABEL,
                ..
            }
        ));
        assert!(!paths.runtime_ca_destination().exists());
        Ok(())
    }
}
