//! Startup sequence of the dockhand executable.
//!
//! # Design
//! - One linear sequence; each acquired process-wide resource is paired with
//!   a guard that drops on the normal return path.
//! - Provisioning and dispatch failures call `process::exit(1)` directly and
//!   skip the guards, matching the watchdog's fail-fast exit.

use std::env;
use std::ffi::{OsStr, OsString};
use std::num::NonZeroUsize;
use std::path::Path;
use std::process::{self, ExitCode};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use dockhand_config::{NodePaths, RuntimeSettings, TrustPaths};
use dockhand_fsops::TrustPlan;
use dockhand_telemetry::{
    GlobalContextGuard, LoggingConfig, ProfileGuard, init_logging, install_panic_hook,
    record_app_mode,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::runtime::{Builder, Runtime};
use tracing::{error, info, warn};

use crate::commands::ModeCommand;
use crate::commands::build::BUILD_ENV;
use crate::diagnostics;
use crate::error::{AppError, AppResult, FAILURE_EXIT_CODE, error_chain};
use crate::reexec;
use crate::registry::command_for;
use crate::watchdog;

/// Inputs of the startup sequence.
pub(crate) struct BootstrapDependencies {
    settings: RuntimeSettings,
    node: NodePaths,
    trust: TrustPaths,
    args: Vec<OsString>,
    build: Option<String>,
    on_terminate: fn(),
}

impl BootstrapDependencies {
    /// Production dependencies: fixed node and trust locations, process args and env.
    pub(crate) fn from_env(settings: RuntimeSettings, args: Vec<OsString>) -> Self {
        Self {
            settings,
            node: NodePaths::default(),
            trust: TrustPaths::default(),
            args,
            build: env::var(BUILD_ENV).ok(),
            on_terminate: watchdog::terminate_process,
        }
    }
}

/// Run the executable and return its exit status.
#[must_use]
pub fn run() -> ExitCode {
    let args: Vec<OsString> = env::args_os().collect();
    if let Some(code) = reexec::init(args.first().map(OsString::as_os_str)) {
        return code;
    }

    let settings = RuntimeSettings::from_env();
    let runtime = match build_runtime(&settings) {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: {}", error_chain(&err));
            return ExitCode::from(FAILURE_EXIT_CODE);
        }
    };
    runtime.block_on(run_app(BootstrapDependencies::from_env(settings, args)))
}

/// The startup sequence after the runtime exists.
pub(crate) async fn run_app(dependencies: BootstrapDependencies) -> ExitCode {
    let BootstrapDependencies {
        settings,
        node,
        trust,
        args,
        build,
        on_terminate,
    } = dependencies;

    let _ = diagnostics::report_node_state(&node);

    let _watchdog = match watchdog::install_with(on_terminate) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("Error: {}", error_chain(&err));
            return ExitCode::from(FAILURE_EXIT_CODE);
        }
    };

    let logging = LoggingConfig {
        level: &settings.log_level,
        format: settings.log_format,
        ..LoggingConfig::default()
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: logging unavailable: {}", error_chain(&err));
    }
    let mut rng = StdRng::seed_from_u64(clock_seed());
    let _context = GlobalContextGuard::new("bootstrap", invocation_id(&mut rng));
    let _panic_hook = install_panic_hook(settings.on_panic);
    let _profile = ProfileGuard::start(settings.profile);

    for rejected in &settings.rejected {
        warn!(field = rejected.field(), error = %rejected, "ignoring invalid setting");
    }
    info!(step_dir = %settings.step_dir.display(), "dockhand bootstrap starting");

    provision_trust_or_exit(&trust);

    let basename = invocation_basename(args.first().map(OsString::as_os_str));
    let command = command_for_or_exit(&basename).with_step_dir(&settings.step_dir);
    record_app_mode(&basename);

    match command.execute_from(args, build).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let chain = error_chain(&err);
            error!(error = %chain, "build step failed");
            eprintln!("Error: {chain}");
            ExitCode::from(FAILURE_EXIT_CODE)
        }
    }
}

fn provision_trust_or_exit(trust: &TrustPaths) {
    for target in TrustPlan::standard(trust).targets() {
        if let Err(err) = target.apply() {
            let chain = error_chain(&err);
            error!(
                target_label = target.label,
                operation = err.operation(),
                path = %err.path().display(),
                error = %chain,
                "trust provisioning failed"
            );
            println!("Error setting up {}: {chain}", target.label);
            process::exit(i32::from(FAILURE_EXIT_CODE));
        }
    }
}

fn command_for_or_exit(basename: &str) -> ModeCommand {
    match command_for(basename) {
        Ok(command) => command,
        Err(err) => {
            error!(basename, error = %err, "invocation name not recognised");
            println!("unknown command name: {basename}");
            process::exit(i32::from(FAILURE_EXIT_CODE));
        }
    }
}

fn build_runtime(settings: &RuntimeSettings) -> AppResult<Runtime> {
    let mut builder = Builder::new_multi_thread();
    builder.enable_all();
    if let Some(workers) = worker_threads(settings.parallelism_override) {
        builder.worker_threads(workers);
    }
    builder.build().map_err(|source| AppError::Runtime {
        operation: "runtime.build",
        source,
    })
}

/// Explicit worker count, or `None` to let tokio honour its own override.
fn worker_threads(override_present: bool) -> Option<usize> {
    if override_present {
        return None;
    }
    Some(thread::available_parallelism().map_or(1, NonZeroUsize::get))
}

fn invocation_basename(argv0: Option<&OsStr>) -> String {
    argv0
        .and_then(|argv0| Path::new(argv0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
        })
}

fn invocation_id(rng: &mut StdRng) -> String {
    format!("{:016x}", rng.random::<u64>())
}
