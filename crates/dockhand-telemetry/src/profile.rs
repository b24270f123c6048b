//! Exit-time resource report selected by `DOCKHAND_PROFILE`.
//!
//! `cpu` reports user and system CPU time, `mem` reports peak resident set
//! size. Both include wall-clock time since the guard started.

use std::time::{Duration, Instant};

use dockhand_config::ProfileMode;
use nix::sys::resource::{Usage, UsageWho, getrusage};
use nix::sys::time::TimeValLike;
use tracing::{info, warn};

use crate::error::{Result, TelemetryError};

/// Resource usage observed between `start` and `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileReport {
    /// Profiling mode that produced the report.
    pub mode: ProfileMode,
    /// Wall-clock time.
    pub wall: Duration,
    /// User CPU time consumed while profiling.
    pub user_cpu: Duration,
    /// System CPU time consumed while profiling.
    pub system_cpu: Duration,
    /// Peak resident set size of the process in KiB.
    pub max_rss_kib: i64,
}

struct Baseline {
    started: Instant,
    user_cpu: Duration,
    system_cpu: Duration,
}

/// Emits a profile report when stopped or dropped.
#[must_use = "dropping the guard ends profiling immediately"]
pub struct ProfileGuard {
    mode: ProfileMode,
    baseline: Option<Baseline>,
}

impl ProfileGuard {
    /// Start profiling in `mode`. Disabled mode, or a failed baseline sample,
    /// yields an inert guard.
    pub fn start(mode: ProfileMode) -> Self {
        if mode == ProfileMode::Disabled {
            return Self {
                mode,
                baseline: None,
            };
        }
        match sample() {
            Ok(usage) => {
                info!(mode = mode.as_str(), "profiling enabled");
                Self {
                    mode,
                    baseline: Some(Baseline {
                        started: Instant::now(),
                        user_cpu: timeval_duration(usage.user_time().num_microseconds()),
                        system_cpu: timeval_duration(usage.system_time().num_microseconds()),
                    }),
                }
            }
            Err(err) => {
                warn!(mode = mode.as_str(), error = %err, "profiling disabled");
                Self {
                    mode,
                    baseline: None,
                }
            }
        }
    }

    /// Whether this guard will produce a report.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.baseline.is_some()
    }

    /// Stop profiling and return the report.
    pub fn stop(mut self) -> Option<ProfileReport> {
        self.finish()
    }

    fn finish(&mut self) -> Option<ProfileReport> {
        let baseline = self.baseline.take()?;
        let usage = match sample() {
            Ok(usage) => usage,
            Err(err) => {
                warn!(mode = self.mode.as_str(), error = %err, "profile sample failed");
                return None;
            }
        };
        let report = ProfileReport {
            mode: self.mode,
            wall: baseline.started.elapsed(),
            user_cpu: timeval_duration(usage.user_time().num_microseconds())
                .saturating_sub(baseline.user_cpu),
            system_cpu: timeval_duration(usage.system_time().num_microseconds())
                .saturating_sub(baseline.system_cpu),
            max_rss_kib: i64::from(usage.max_rss()),
        };
        match report.mode {
            ProfileMode::Memory => info!(
                wall_ms = report.wall.as_millis(),
                max_rss_kib = report.max_rss_kib,
                "memory profile"
            ),
            ProfileMode::Cpu | ProfileMode::Disabled => info!(
                wall_ms = report.wall.as_millis(),
                user_ms = report.user_cpu.as_millis(),
                system_ms = report.system_cpu.as_millis(),
                "cpu profile"
            ),
        }
        Some(report)
    }
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        let _ = self.finish();
    }
}

fn sample() -> Result<Usage> {
    getrusage(UsageWho::RUSAGE_SELF).map_err(|source| TelemetryError::ResourceUsage { source })
}

fn timeval_duration(micros: i64) -> Duration {
    Duration::from_micros(u64::try_from(micros).unwrap_or(0))
}
