//! Launching a mode's step program.

use std::ffi::OsString;
use std::fmt::Debug;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::build::BUILD_ENV;

/// A fully resolved step program launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepInvocation {
    /// Executable to run.
    pub program: PathBuf,
    /// Arguments, starting with the forwarded global flags.
    pub args: Vec<OsString>,
    /// Raw build descriptor handed to the child as `BUILD`.
    pub build: String,
}

/// How a step program finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepStatus {
    /// Exit code, or `None` when the child was killed by a signal.
    pub code: Option<i32>,
}

impl StepStatus {
    /// Whether the step exited with code zero.
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Runs step programs on behalf of a mode command.
#[async_trait]
pub trait StepExecutor: Debug + Send + Sync {
    /// Run the step to completion.
    ///
    /// # Errors
    ///
    /// Returns the IO error when the program cannot be started or awaited.
    async fn run(&self, invocation: &StepInvocation) -> io::Result<StepStatus>;
}

/// Spawns the step as a child process sharing this process's stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

#[async_trait]
impl StepExecutor for ProcessExecutor {
    async fn run(&self, invocation: &StepInvocation) -> io::Result<StepStatus> {
        debug!(program = %invocation.program.display(), "spawning step program");
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .env(BUILD_ENV, &invocation.build)
            .status()
            .await?;
        Ok(StepStatus {
            code: status.code(),
        })
    }
}
