//! Invocation-name dispatch.
//!
//! The executable's basename selects exactly one build mode. The set is
//! closed: any other name is a startup error, never a fallback.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

use crate::commands::build::StrategyKind;
use crate::commands::{
    ModeCommand, new_docker_builder_command, new_extract_image_content_command,
    new_git_clone_command, new_manage_dockerfile_command, new_s2i_builder_command,
};

/// Build-step modes, one per recognised invocation name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildMode {
    /// Source-to-image assembly.
    SourceToImage,
    /// Container image build from a Dockerfile.
    DockerBuild,
    /// Source retrieval.
    GitClone,
    /// Dockerfile preparation.
    ManageDockerfile,
    /// Copying content out of images.
    ExtractImageContent,
}

/// Constructor contract shared by every mode command.
pub type CommandConstructor = fn(&str) -> ModeCommand;

impl BuildMode {
    /// Every mode, in registry order.
    pub const ALL: [Self; 5] = [
        Self::SourceToImage,
        Self::DockerBuild,
        Self::GitClone,
        Self::ManageDockerfile,
        Self::ExtractImageContent,
    ];

    /// The invocation name that selects this mode.
    #[must_use]
    pub const fn basename(self) -> &'static str {
        match self {
            Self::SourceToImage => "openshift-sti-build",
            Self::DockerBuild => "openshift-docker-build",
            Self::GitClone => "openshift-git-clone",
            Self::ManageDockerfile => "openshift-manage-dockerfile",
            Self::ExtractImageContent => "openshift-extract-image-content",
        }
    }

    /// Exact-match lookup of an invocation name.
    #[must_use]
    pub fn from_basename(basename: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.basename() == basename)
    }

    /// Constructor for this mode's command.
    #[must_use]
    pub const fn constructor(self) -> CommandConstructor {
        match self {
            Self::SourceToImage => new_s2i_builder_command,
            Self::DockerBuild => new_docker_builder_command,
            Self::GitClone => new_git_clone_command,
            Self::ManageDockerfile => new_manage_dockerfile_command,
            Self::ExtractImageContent => new_extract_image_content_command,
        }
    }

    /// Whether builds using `strategy` can run in this mode.
    #[must_use]
    pub const fn accepts(self, strategy: StrategyKind) -> bool {
        match self {
            Self::SourceToImage => matches!(strategy, StrategyKind::Source),
            Self::DockerBuild => matches!(strategy, StrategyKind::Docker),
            Self::GitClone | Self::ManageDockerfile | Self::ExtractImageContent => true,
        }
    }
}

impl Display for BuildMode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.basename())
    }
}

/// Dispatch failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The invocation name is not one of the recognised modes.
    #[error("unknown command name")]
    UnknownCommand {
        /// Invocation name that failed to match.
        basename: String,
    },
}

/// Build the command for `basename` with the global flags attached.
///
/// # Errors
///
/// Returns `RegistryError::UnknownCommand` when `basename` matches no mode.
pub fn command_for(basename: &str) -> Result<ModeCommand, RegistryError> {
    let mode = BuildMode::from_basename(basename).ok_or_else(|| RegistryError::UnknownCommand {
        basename: basename.to_string(),
    })?;
    let command = (mode.constructor())(basename);
    Ok(command.attach_global_flags())
}
