//! Fixed filesystem locations consulted during bootstrap.
//!
//! # Design
//! - Production locations are constants; the structs only exist so tests can
//!   point the same logic at scratch directories.

use std::path::{Path, PathBuf};

/// Kubelet registry credentials mounted from the node.
pub const NODE_CONFIG_PATH: &str = "/node/var/lib/kubelet/config.json";
/// Node trust anchors, enumerated for diagnostics only.
pub const TRUST_ANCHOR_DIR: &str = "/node/etc/pki/ca-trust/extracted/pem";
/// Service account secret mount that carries the cluster CA.
pub const SECRET_CERTS_MOUNT_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount";
/// Config map mount that carries per-registry CA bundles.
pub const CONFIGMAP_CERTS_MOUNT_PATH: &str = "/var/run/configs/openshift.io/certs";
/// System TLS certificate directory.
pub const TLS_CERT_ROOT: &str = "/etc/pki/tls/certs";
/// Container runtime per-registry certificate directory.
pub const RUNTIME_CERT_ROOT: &str = "/etc/docker/certs.d";

const CLUSTER_CA_SOURCE_NAME: &str = "ca.crt";
const CLUSTER_CA_DESTINATION_NAME: &str = "cluster.crt";
const RUNTIME_CA_SOURCE_NAME: &str = "certs.d";

/// Node-level files read for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePaths {
    /// Node registry configuration file.
    pub config_json: PathBuf,
    /// Directory of extracted trust anchors.
    pub trust_anchors: PathBuf,
}

impl Default for NodePaths {
    fn default() -> Self {
        Self {
            config_json: PathBuf::from(NODE_CONFIG_PATH),
            trust_anchors: PathBuf::from(TRUST_ANCHOR_DIR),
        }
    }
}

/// Source mounts and destination roots used for trust provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustPaths {
    /// Secret mount root holding `ca.crt`.
    pub secret_mount: PathBuf,
    /// Config map mount root holding `certs.d/`.
    pub configmap_mount: PathBuf,
    /// Destination directory for the cluster CA.
    pub tls_cert_root: PathBuf,
    /// Destination directory for runtime registry CAs.
    pub runtime_cert_root: PathBuf,
}

impl Default for TrustPaths {
    fn default() -> Self {
        Self {
            secret_mount: PathBuf::from(SECRET_CERTS_MOUNT_PATH),
            configmap_mount: PathBuf::from(CONFIGMAP_CERTS_MOUNT_PATH),
            tls_cert_root: PathBuf::from(TLS_CERT_ROOT),
            runtime_cert_root: PathBuf::from(RUNTIME_CERT_ROOT),
        }
    }
}

impl TrustPaths {
    /// Lay out all four locations underneath `root`, mirroring the production tree.
    #[must_use]
    pub fn rooted_at(root: &Path) -> Self {
        let defaults = Self::default();
        Self {
            secret_mount: reroot(root, &defaults.secret_mount),
            configmap_mount: reroot(root, &defaults.configmap_mount),
            tls_cert_root: reroot(root, &defaults.tls_cert_root),
            runtime_cert_root: reroot(root, &defaults.runtime_cert_root),
        }
    }

    /// Cluster CA certificate inside the secret mount.
    #[must_use]
    pub fn cluster_ca_source(&self) -> PathBuf {
        self.secret_mount.join(CLUSTER_CA_SOURCE_NAME)
    }

    /// Where the cluster CA lands in the system trust directory.
    #[must_use]
    pub fn cluster_ca_destination(&self) -> PathBuf {
        self.tls_cert_root.join(CLUSTER_CA_DESTINATION_NAME)
    }

    /// Per-registry certificate tree inside the config map mount.
    #[must_use]
    pub fn runtime_ca_source(&self) -> PathBuf {
        self.configmap_mount.join(RUNTIME_CA_SOURCE_NAME)
    }

    /// Where the per-registry certificate tree lands.
    #[must_use]
    pub fn runtime_ca_destination(&self) -> PathBuf {
        self.runtime_cert_root.clone()
    }
}

impl NodePaths {
    /// Lay out the node locations underneath `root`.
    #[must_use]
    pub fn rooted_at(root: &Path) -> Self {
        let defaults = Self::default();
        Self {
            config_json: reroot(root, &defaults.config_json),
            trust_anchors: reroot(root, &defaults.trust_anchors),
        }
    }
}

fn reroot(root: &Path, absolute: &Path) -> PathBuf {
    root.join(absolute.strip_prefix("/").unwrap_or(absolute))
}
