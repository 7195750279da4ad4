//! rslua - run scripted devices of a station without a host UI.
//!
//! # Configuration
//!
//! Bridge settings are loaded with priority:
//!
//! 1. Environment variables (`RSLUA_*`, highest priority)
//! 2. Config file given with `--config`
//! 3. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `RSLUA_LOG_PREFIX`: Prefix of messages written by the bridge
//! - `RSLUA_REFRESH_MARKER`: Host log text that refreshes every device
//! - `RSLUA_REFRESH_DEBOUNCE_MS`: Minimum interval between refreshes
//! - `RSLUA_WARN_ACYCLIC`: Warn about connections refusing cycles (`true`/`false`)
//! - `RUST_LOG`: Diagnostic log filter when neither `--debug` nor `--verbose` is set

mod runner;
mod station_file;

use anyhow::{Context, Result};
use clap::Parser;
use rslua_script::ConfigLoader;
use runner::Simulation;
use station_file::StationFile;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// rslua - headless runner for per-device Lua scripts
#[derive(Parser, Debug)]
#[command(name = "rslua")]
#[command(version, about, long_about = None)]
struct Args {
    /// Station description (TOML)
    station: PathBuf,

    /// Number of simulation steps to run
    #[arg(short = 'n', long, default_value_t = 10)]
    steps: u64,

    /// Duration of one simulation step in milliseconds
    #[arg(long, default_value_t = 24.0)]
    step_ms: f64,

    /// Bridge config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // --debug > --verbose > RUST_LOG env > default "warn"
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();

    let mut loader = ConfigLoader::new();
    if let Some(ref path) = args.config {
        loader = loader.with_file(path.clone());
    }
    let config = loader
        .load()
        .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;

    let file = StationFile::load(&args.station)
        .with_context(|| format!("cannot load station {}", args.station.display()))?;
    info!(station = %file.name, devices = file.devices.len(), "Loaded station");

    let mut sim = Simulation::new(&file, config)?;
    sim.run(args.steps, args.step_ms);
    let report = sim.report();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}
