//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Config path used when `--config` is not given; absent file means defaults.
pub const DEFAULT_CONFIG: &str = "etc/axlecal.toml";

#[derive(Parser, Debug)]
#[command(name = "axlecal", version, about = "Axle load sensor calibration fitter")]
pub struct Cli {
    /// Path to config TOML (typed). Defaults to etc/axlecal.toml when present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print results and logs as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit a weight model for every channel in a calibration CSV
    FitChannel {
        /// Calibration sample CSV (strict header)
        #[arg(long, value_name = "FILE")]
        samples: PathBuf,
        /// Only fit this channel
        #[arg(long, value_name = "ID")]
        channel: Option<String>,
        /// Worker threads (overrides [batch] jobs; 0 = one per core)
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
    },
    /// Group steer/drive samples into sessions and fit the virtual steer model
    FitSteer {
        /// Calibration sample CSV with the axle_group column filled in
        #[arg(long, value_name = "FILE")]
        samples: PathBuf,
    },
    /// Fit one channel and predict the weight for a single reading
    Predict {
        /// Calibration sample CSV (strict header)
        #[arg(long, value_name = "FILE")]
        samples: PathBuf,
        /// Channel to fit
        #[arg(long, value_name = "ID")]
        channel: String,
        /// Absolute bag pressure (psi)
        #[arg(long, value_name = "PSI")]
        bag: f64,
        /// Absolute ambient pressure (psi)
        #[arg(long, value_name = "PSI")]
        ambient: f64,
        /// Air temperature, in the configured unit
        #[arg(long, value_name = "T", allow_hyphen_values = true)]
        temperature: f64,
    },
    /// Health check for operational monitoring
    Health,
}
