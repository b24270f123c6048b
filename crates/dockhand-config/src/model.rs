//! Typed selectors parsed from the process environment.
//!
//! # Design
//! - Every selector has an explicit default for the unset case.
//! - Parsing is case-insensitive and whitespace tolerant; unknown values are errors.

use std::str::FromStr;

use crate::error::ConfigError;

/// Highest build log verbosity accepted for `--loglevel` and `BUILD_LOGLEVEL`.
pub const MAX_BUILD_LOGLEVEL: u8 = 10;

/// Output formats for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit human-readable logs.
    Pretty,
}

impl LogFormat {
    /// Choose a sensible default for the current build.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            _ => Err(ConfigError::invalid(
                "DOCKHAND_LOG_FORMAT",
                "unknown_format",
                value,
            )),
        }
    }
}

/// What the process does when a panic escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanicBehavior {
    /// Log the panic and continue unwinding with the default hook.
    #[default]
    Log,
    /// Log the panic and abort the process immediately.
    Crash,
}

impl FromStr for PanicBehavior {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "log" => Ok(Self::Log),
            "crash" => Ok(Self::Crash),
            _ => Err(ConfigError::invalid(
                "DOCKHAND_ON_PANIC",
                "unknown_behavior",
                value,
            )),
        }
    }
}

/// Process profiling selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileMode {
    /// Profiling disabled.
    #[default]
    Disabled,
    /// Report user and system CPU time consumed at exit.
    Cpu,
    /// Report the peak resident set size at exit.
    Memory,
}

impl ProfileMode {
    /// Stable label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "none",
            Self::Cpu => "cpu",
            Self::Memory => "mem",
        }
    }
}

impl FromStr for ProfileMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::Disabled),
            "cpu" => Ok(Self::Cpu),
            "mem" | "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::invalid(
                "DOCKHAND_PROFILE",
                "unknown_mode",
                value,
            )),
        }
    }
}
