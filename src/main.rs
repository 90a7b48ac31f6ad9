//! cuescript CLI entry point.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cuescript::engine::EngineConfig;

/// Default poll cadence for `simulate`, from the engine's own tick
/// interval.
fn default_tick_ms() -> u64 {
    (EngineConfig::default().tick_interval * 1000.0).round() as u64
}

#[derive(Parser)]
#[command(
    name = "cuescript",
    version,
    about = "Annotation-driven playback automation",
    long_about = "Parses playback annotations like [00:01:30-00:02:00, 80%, 1.25x, ->] out of \
                  plain-text notes and drives playback from them."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the annotations parsed from a notes file
    Parse {
        /// Notes file to scan
        file: PathBuf,
        /// Emit the parse result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the automation engine over a simulated player
    Simulate {
        /// Notes file to scan
        file: PathBuf,
        /// Playback position to start from, in seconds
        #[arg(long, default_value_t = 0.0)]
        start: f64,
        /// Wall-clock seconds to simulate
        #[arg(long, default_value_t = 60.0)]
        duration: f64,
        /// Poll tick interval in milliseconds
        #[arg(long, default_value_t = default_tick_ms())]
        tick_ms: u64,
        /// Emit the event trace as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Parse { file, json } => commands::parse::handle(&file, json),
        Command::Simulate {
            file,
            start,
            duration,
            tick_ms,
            json,
        } => commands::simulate::handle(&file, start, duration, tick_ms, json),
    }
}
