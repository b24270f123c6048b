//! Mode commands.
//!
//! # Design
//! - Each mode validates its inputs (flags, `BUILD` descriptor, strategy) and
//!   then delegates the actual work to its step program.
//! - The step runner sits behind `StepExecutor` so validation is testable
//!   without spawning processes.

pub mod build;
pub mod flags;
pub mod modes;
pub mod step;

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::{Args, Command, FromArgMatches};
use dockhand_config::settings::DEFAULT_STEP_DIR;
use thiserror::Error;
use tracing::info;

use crate::registry::BuildMode;
use build::{BUILD_ENV, BuildDescriptor, StrategyKind};
use flags::GlobalFlags;
use step::{ProcessExecutor, StepExecutor, StepInvocation};

pub use modes::{
    new_docker_builder_command, new_extract_image_content_command, new_git_clone_command,
    new_manage_dockerfile_command, new_s2i_builder_command,
};

pub(crate) const PASSTHROUGH_ARG: &str = "args";

/// Result alias for mode command execution.
pub type CommandResult<T> = Result<T, CommandError>;

/// Failures of a selected mode command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Arguments did not parse.
    #[error("invalid command-line arguments")]
    Usage {
        /// Parser error.
        source: clap::Error,
    },
    /// Help or version output could not be written.
    #[error("failed to write command output")]
    Output {
        /// Source IO error.
        source: io::Error,
    },
    /// The build descriptor variable is unset.
    #[error("build descriptor missing from environment")]
    MissingBuild {
        /// Variable that was read.
        variable: &'static str,
    },
    /// The build descriptor is not a decodable document.
    #[error("build descriptor could not be decoded")]
    InvalidBuild {
        /// Decoder error.
        source: serde_json::Error,
    },
    /// The build descriptor is some other object kind.
    #[error("build descriptor has unexpected kind")]
    UnexpectedKind {
        /// Kind found in the document.
        kind: String,
    },
    /// The build's strategy cannot run in this mode.
    #[error("build strategy not supported by this mode")]
    StrategyMismatch {
        /// Selected mode.
        mode: BuildMode,
        /// Requested strategy.
        strategy: StrategyKind,
    },
    /// The step program could not be started.
    #[error("step program could not be started")]
    StepSpawn {
        /// Program path.
        program: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// The step program exited unsuccessfully.
    #[error("step program failed")]
    StepFailed {
        /// Selected mode.
        mode: BuildMode,
        /// Exit code, `None` when killed by a signal.
        code: Option<i32>,
    },
}

/// A runnable mode command.
#[derive(Debug)]
pub struct ModeCommand {
    mode: BuildMode,
    name: String,
    cli: Command,
    step_dir: PathBuf,
    executor: Arc<dyn StepExecutor>,
}

impl ModeCommand {
    /// Assemble a command for `mode` invoked as `name`.
    #[must_use]
    pub fn new(mode: BuildMode, name: &str, cli: Command) -> Self {
        Self {
            mode,
            name: name.to_string(),
            cli,
            step_dir: PathBuf::from(DEFAULT_STEP_DIR),
            executor: Arc::new(ProcessExecutor),
        }
    }

    /// Selected mode.
    #[must_use]
    pub const fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Invocation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying argument parser.
    #[must_use]
    pub const fn cli(&self) -> &Command {
        &self.cli
    }

    /// Directory the step program is resolved in.
    #[must_use]
    pub fn step_dir(&self) -> &Path {
        &self.step_dir
    }

    /// Add the global flag set to the parser.
    #[must_use]
    pub fn attach_global_flags(mut self) -> Self {
        self.cli = GlobalFlags::augment_args(self.cli);
        self
    }

    /// Resolve step programs under `step_dir`.
    #[must_use]
    pub fn with_step_dir(mut self, step_dir: impl Into<PathBuf>) -> Self {
        self.step_dir = step_dir.into();
        self
    }

    /// Replace the step runner.
    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn StepExecutor>) -> Self {
        self.executor = executor;
        self
    }

    /// Run with the process arguments and the `BUILD` environment variable.
    ///
    /// # Errors
    ///
    /// See [`ModeCommand::execute_from`].
    pub async fn execute(self) -> CommandResult<()> {
        let build = env::var(BUILD_ENV).ok();
        self.execute_from(env::args_os(), build).await
    }

    /// Run with explicit arguments (including the program name) and build
    /// descriptor.
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` for unparsable arguments, a missing or invalid
    /// descriptor, an incompatible strategy, or a step program that could not
    /// start or exited unsuccessfully.
    pub async fn execute_from<I, T>(mut self, args: I, build: Option<String>) -> CommandResult<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = match self.cli.try_get_matches_from_mut(args) {
            Ok(matches) => matches,
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                return err.print().map_err(|source| CommandError::Output { source });
            }
            Err(source) => return Err(CommandError::Usage { source }),
        };
        let flags =
            GlobalFlags::from_arg_matches(&matches).map_err(|source| CommandError::Usage { source })?;
        let passthrough: Vec<OsString> = matches
            .get_many::<OsString>(PASSTHROUGH_ARG)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        let raw = build.ok_or(CommandError::MissingBuild {
            variable: BUILD_ENV,
        })?;
        let descriptor = BuildDescriptor::parse(&raw)?;
        let strategy = descriptor.strategy();
        if !self.mode.accepts(strategy) {
            return Err(CommandError::StrategyMismatch {
                mode: self.mode,
                strategy,
            });
        }

        let mut step_args = vec![OsString::from("--loglevel"), flags.loglevel.to_string().into()];
        step_args.extend(passthrough);
        let invocation = StepInvocation {
            program: self.step_dir.join(&self.name),
            args: step_args,
            build: raw,
        };
        info!(
            mode = %self.mode,
            build = %descriptor.metadata.name,
            namespace = %descriptor.metadata.namespace,
            strategy = %strategy,
            loglevel = flags.loglevel,
            "running build step"
        );

        let status = self
            .executor
            .run(&invocation)
            .await
            .map_err(|source| CommandError::StepSpawn {
                program: invocation.program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(CommandError::StepFailed {
                mode: self.mode,
                code: status.code,
            });
        }
        info!(mode = %self.mode, "build step completed");
        Ok(())
    }
}
