//! Flags shared by every mode command.

use clap::Args;
use dockhand_config::settings::{ENV_BUILD_LOGLEVEL, parse_build_loglevel};

/// Global flag set attached to each mode command by the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Args)]
pub struct GlobalFlags {
    /// Build log verbosity forwarded to the step program.
    #[arg(
        long,
        global = true,
        env = ENV_BUILD_LOGLEVEL,
        default_value_t = 0,
        value_parser = parse_build_loglevel,
        help = "Build log verbosity (0-10)"
    )]
    pub loglevel: u8,
}
