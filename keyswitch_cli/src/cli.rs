//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "keyswitch", version, about = "Hall-effect key switch CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/keyswitch.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the actuation loop
    Run {
        /// Stop after this many ticks; runs until Ctrl-C when omitted
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
        /// Read the sensor inside the tick loop instead of a sampler thread
        #[arg(long, action = ArgAction::SetTrue)]
        direct: bool,
        /// Start in rapid-trigger mode regardless of the config
        #[arg(long, action = ArgAction::SetTrue)]
        rapid_trigger: bool,
        /// Load a persisted calibration range from FILE (takes precedence
        /// over the [calibration] section in the config)
        #[arg(long, value_name = "FILE")]
        calibration: Option<PathBuf>,
        /// Persist the committed calibration range to FILE on exit
        #[arg(long, value_name = "FILE")]
        save_calibration: Option<PathBuf>,
    },
    /// Quick health check (hardware presence / sim ok)
    SelfCheck,
}
