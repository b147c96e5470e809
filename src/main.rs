//! glazebot
//!
//! Automates a repetitive pattern-matching minigame by sampling small
//! screen regions, classifying them with HSV color thresholds, and
//! emitting synthetic key presses and clicks in response. Thresholds and
//! coordinates are empirically calibrated; the calibration subcommands
//! exist to re-tune them when the layout moves.

mod calibration;
mod capture;
mod config;
mod driver;
mod input;
mod paths;
mod vision;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::driver::StopRule;

#[derive(Parser)]
#[command(name = "glazebot", version, about = "HSV-threshold automation for the glaze minigame")]
struct Cli {
    /// Path to config.json (defaults to the file next to the executable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the automation loop
    Run {
        /// Stop after this many rounds
        #[arg(long, conflicts_with = "duration")]
        rounds: Option<u32>,
        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<u64>,
    },
    /// Capture a screen region by hovering the mouse over its corners
    Calibrate {
        /// Label printed with the result (e.g. marker, rewards, zone)
        #[arg(default_value = "marker")]
        label: String,
    },
    /// Dump per-element color masks for threshold tuning
    DumpMasks {
        /// Use an existing image instead of capturing the pattern region
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Monitor marker present/absent transitions
    WatchMarker,
    /// Capture the pattern region once and print the decoder verdict
    TestDetection,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run { rounds, duration } => {
            let stop = match (rounds, duration) {
                (Some(n), _) => StopRule::Rounds(n),
                (None, Some(secs)) => StopRule::Duration(Duration::from_secs(secs)),
                (None, None) => StopRule::Unlimited,
            };
            driver::run(config, stop)
        }
        Command::Calibrate { label } => calibration::capture_region_coords(&label),
        Command::DumpMasks { input } => calibration::dump_masks(&config, input.as_deref()),
        Command::WatchMarker => calibration::watch_marker(&config),
        Command::TestDetection => calibration::run_detection_test(&config),
    }
}
