//! Environment-derived runtime settings.
//!
//! # Design
//! - Loading never fails: rejected values fall back to defaults and are kept
//!   in `rejected` so the caller can log them once logging is up.
//! - Lookup is injectable so tests never mutate the process environment.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::model::{LogFormat, MAX_BUILD_LOGLEVEL, PanicBehavior, ProfileMode};

/// Panic behaviour selector.
pub const ENV_ON_PANIC: &str = "DOCKHAND_ON_PANIC";
/// Profiling selector.
pub const ENV_PROFILE: &str = "DOCKHAND_PROFILE";
/// Presence disables the explicit worker-thread sizing.
pub const ENV_PARALLELISM_OVERRIDE: &str = "TOKIO_WORKER_THREADS";
/// Fallback log filter when `RUST_LOG` is absent.
pub const ENV_LOG_LEVEL: &str = "DOCKHAND_LOG_LEVEL";
/// Log output format override.
pub const ENV_LOG_FORMAT: &str = "DOCKHAND_LOG_FORMAT";
/// Default build log verbosity passed to step programs, read by the `--loglevel` flag.
pub const ENV_BUILD_LOGLEVEL: &str = "BUILD_LOGLEVEL";
/// Directory containing one step program per invocation name.
pub const ENV_STEP_DIR: &str = "DOCKHAND_STEP_DIR";

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Default location of the step programs.
pub const DEFAULT_STEP_DIR: &str = "/usr/libexec/dockhand";

/// Settings read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    /// Panic hook behaviour.
    pub on_panic: PanicBehavior,
    /// Profiling mode.
    pub profile: ProfileMode,
    /// Whether a worker-thread override is present in the environment.
    pub parallelism_override: bool,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
    /// Directory holding the step programs.
    pub step_dir: PathBuf,
    /// Values that were present but rejected.
    pub rejected: Vec<ConfigError>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            on_panic: PanicBehavior::default(),
            profile: ProfileMode::default(),
            parallelism_override: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::infer(),
            step_dir: PathBuf::from(DEFAULT_STEP_DIR),
            rejected: Vec::new(),
        }
    }
}

impl RuntimeSettings {
    /// Read settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through an arbitrary lookup function.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let mut rejected = Vec::new();

        if let Some(raw) = lookup(ENV_ON_PANIC) {
            match raw.parse() {
                Ok(value) => settings.on_panic = value,
                Err(err) => rejected.push(err),
            }
        }
        if let Some(raw) = lookup(ENV_PROFILE) {
            match raw.parse() {
                Ok(value) => settings.profile = value,
                Err(err) => rejected.push(err),
            }
        }
        settings.parallelism_override = lookup(ENV_PARALLELISM_OVERRIDE).is_some();

        if let Some(raw) = lookup(ENV_LOG_LEVEL) {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                rejected.push(ConfigError::invalid(ENV_LOG_LEVEL, "empty", &raw));
            } else {
                settings.log_level = trimmed.to_string();
            }
        }
        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            match raw.parse() {
                Ok(value) => settings.log_format = value,
                Err(err) => rejected.push(err),
            }
        }
        if let Some(raw) = lookup(ENV_STEP_DIR) {
            let path = PathBuf::from(raw.trim());
            if path.is_absolute() {
                settings.step_dir = path;
            } else {
                rejected.push(ConfigError::invalid(ENV_STEP_DIR, "not_absolute", &raw));
            }
        }

        settings.rejected = rejected;
        settings
    }
}

/// Parse a build log verbosity in `0..=MAX_BUILD_LOGLEVEL`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidField` when the value is not an integer or is
/// out of range.
pub fn parse_build_loglevel(raw: &str) -> Result<u8, ConfigError> {
    let value: u8 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(ENV_BUILD_LOGLEVEL, "not_an_integer", raw))?;
    if value > MAX_BUILD_LOGLEVEL {
        return Err(ConfigError::invalid(
            ENV_BUILD_LOGLEVEL,
            "out_of_range",
            raw,
        ));
    }
    Ok(value)
}
