//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls event and error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

#[derive(Parser, Debug)]
#[command(name = "washer", version, about = "Washing machine controller (simulated panel)")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/washer_config.toml")]
    pub config: PathBuf,

    /// Emit events and logs as JSON lines instead of text
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
    /// Run the controller in real time, driven by console commands on stdin
    #[command(
        long_about = "Run the controller in real time against the simulated panel.\n\nType commands on stdin, one per line:\n  power | start            press a button\n  <input> <value>          set a knob or sensor, e.g. `duration 0.3`\n  door open | door closed  move the door\n  status                   print state and safety flags\n  quit                     stop the controller\n\nInputs: rpm, temperature, duration, load, light, water_temp (values in [0, 1])."
    )]
    Run {
        /// Stop after this many milliseconds of controller time
        #[arg(long, value_name = "MS")]
        until_ms: Option<u64>,
    },
    /// Replay a scenario CSV on a virtual clock and print the resulting events
    Simulate {
        /// Scenario CSV with headers at_ms,input,value
        #[arg(long, value_name = "FILE")]
        script: PathBuf,
        /// Stop at this controller time (default: script end plus a full cycle)
        #[arg(long, value_name = "MS")]
        until_ms: Option<u64>,
    },
    /// Read every channel once and exercise the outputs
    SelfCheck,
}
