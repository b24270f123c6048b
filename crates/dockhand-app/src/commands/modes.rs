//! Constructors for the five mode commands.

use clap::{Arg, Command, value_parser};
use std::ffi::OsString;

use super::{ModeCommand, PASSTHROUGH_ARG};
use crate::registry::BuildMode;

fn mode_cli(name: &str, about: &'static str, long_about: &'static str) -> Command {
    Command::new(name.to_string())
        .about(about)
        .long_about(long_about)
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new(PASSTHROUGH_ARG)
                .num_args(0..)
                .last(true)
                .value_parser(value_parser!(OsString))
                .help("Extra arguments forwarded to the step program after `--`"),
        )
}

/// Source-to-image builder.
#[must_use]
pub fn new_s2i_builder_command(name: &str) -> ModeCommand {
    ModeCommand::new(
        BuildMode::SourceToImage,
        name,
        mode_cli(
            name,
            "Run a Source-To-Image build",
            "Perform a Source-To-Image build. The build is described by the BUILD \
             environment variable and is expected to run inside a build container.",
        ),
    )
}

/// Dockerfile-based image builder.
#[must_use]
pub fn new_docker_builder_command(name: &str) -> ModeCommand {
    ModeCommand::new(
        BuildMode::DockerBuild,
        name,
        mode_cli(
            name,
            "Run a Docker build",
            "Perform a Docker build. The build is described by the BUILD environment \
             variable and is expected to run inside a build container.",
        ),
    )
}

/// Source retrieval.
#[must_use]
pub fn new_git_clone_command(name: &str) -> ModeCommand {
    ModeCommand::new(
        BuildMode::GitClone,
        name,
        mode_cli(
            name,
            "Git clone source code and its submodules",
            "Clone the build's source repository and its submodules into the build \
             working directory.",
        ),
    )
}

/// Dockerfile preparation.
#[must_use]
pub fn new_manage_dockerfile_command(name: &str) -> ModeCommand {
    ModeCommand::new(
        BuildMode::ManageDockerfile,
        name,
        mode_cli(
            name,
            "Manage a dockerfile for a docker build",
            "Write or patch the Dockerfile used by the build according to the build \
             definition.",
        ),
    )
}

/// Image content extraction.
#[must_use]
pub fn new_extract_image_content_command(name: &str) -> ModeCommand {
    ModeCommand::new(
        BuildMode::ExtractImageContent,
        name,
        mode_cli(
            name,
            "Extract build input content from existing images",
            "Copy the image sources listed in the build definition into the build \
             working directory.",
        ),
    )
}
