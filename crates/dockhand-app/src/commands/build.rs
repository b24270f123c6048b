//! The build descriptor every mode receives through the environment.

use std::fmt::{self, Display, Formatter};

use serde::Deserialize;

use super::{CommandError, CommandResult};

/// Environment variable carrying the build descriptor JSON.
pub const BUILD_ENV: &str = "BUILD";
/// The only accepted descriptor kind.
pub const BUILD_KIND: &str = "Build";

/// Build strategies a descriptor can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum StrategyKind {
    /// Source-to-image.
    Source,
    /// Dockerfile build.
    Docker,
    /// Custom builder image.
    Custom,
    /// Pipeline build.
    JenkinsPipeline,
}

impl StrategyKind {
    /// Wire name of the strategy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "Source",
            Self::Docker => "Docker",
            Self::Custom => "Custom",
            Self::JenkinsPipeline => "JenkinsPipeline",
        }
    }
}

impl Display for StrategyKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Decoded build document. Fields not listed here are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDescriptor {
    /// Object kind; must be `Build`.
    pub kind: String,
    /// API group/version of the document.
    #[serde(default)]
    pub api_version: String,
    /// Object metadata.
    #[serde(default)]
    pub metadata: BuildMetadata,
    /// Build specification.
    pub spec: BuildSpec,
}

/// Identifying metadata of a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuildMetadata {
    /// Build name.
    #[serde(default)]
    pub name: String,
    /// Build namespace.
    #[serde(default)]
    pub namespace: String,
}

/// The part of the build specification the dispatcher inspects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildSpec {
    /// Requested strategy.
    pub strategy: BuildStrategy,
}

/// Strategy selector.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildStrategy {
    /// Strategy type.
    #[serde(rename = "type")]
    pub kind: StrategyKind,
}

impl BuildDescriptor {
    /// Decode and validate a descriptor.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidBuild` when the JSON does not decode and
    /// `CommandError::UnexpectedKind` when the document is not a `Build`.
    pub fn parse(raw: &str) -> CommandResult<Self> {
        let descriptor: Self =
            serde_json::from_str(raw).map_err(|source| CommandError::InvalidBuild { source })?;
        if descriptor.kind != BUILD_KIND {
            return Err(CommandError::UnexpectedKind {
                kind: descriptor.kind,
            });
        }
        Ok(descriptor)
    }

    /// Requested strategy.
    #[must_use]
    pub const fn strategy(&self) -> StrategyKind {
        self.spec.strategy.kind
    }
}
