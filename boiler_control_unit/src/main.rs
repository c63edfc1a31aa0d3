//! # Boiler Control Unit
//!
//! Runs the boiler simulation: physics, control and fault injection tasks
//! against the simulated plant. Stops after `DURATION_SECS` or on Ctrl-C,
//! then forces the plant into its safe state and prints a summary.

use boiler_common::config::BoilerConfig;
use boiler_control_unit::config::{Overrides, resolve};
use boiler_control_unit::{Simulation, SimulationError};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Boiler Control Unit: water-level control simulation
#[derive(Parser, Debug)]
#[command(name = "boiler_control_unit")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Dual-pump boiler water-level control simulation")]
struct Args {
    /// Run for this many seconds, then stop. Runs until Ctrl-C if omitted.
    #[arg(value_name = "DURATION_SECS")]
    duration: Option<u64>,

    /// Path to a boiler TOML configuration. Defaults to the reference boiler.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for a reproducible random fault schedule.
    #[arg(long)]
    seed: Option<u64>,

    /// Disable fault injection.
    #[arg(long)]
    no_faults: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let overrides = Overrides {
        seed: args.seed,
        disable_faults: args.no_faults,
    };
    let config = resolve(args.config.as_deref(), overrides);
    setup_tracing(&args, config.as_ref().ok());

    info!("Boiler Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));
    match &args.config {
        Some(path) => info!("Configuration file: {}", path.display()),
        None => info!("No configuration file given, using reference boiler"),
    }

    let result = config
        .map_err(SimulationError::from)
        .and_then(|config| run(&args, &config));
    if let Err(e) = result {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Boiler Control Unit shutdown complete");
}

fn run(args: &Args, config: &BoilerConfig) -> Result<(), SimulationError> {
    info!(
        "Config OK: C={} M1={} M2={} N1={} N2={} V={} P={} q0={}",
        config.limits.capacity,
        config.limits.min_safe,
        config.limits.max_safe,
        config.limits.normal_low,
        config.limits.normal_high,
        config.limits.max_vapor_rate,
        config.limits.pump_capacity,
        config.plant.initial_quantity,
    );

    let simulation = Simulation::start(config)?;
    let stop = simulation.stop_signal();

    // Setup signal handler for graceful shutdown.
    let handler_stop = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        handler_stop.request_stop();
    }) {
        if let Err(shutdown) = simulation.shutdown(true) {
            error!("Shutdown after signal handler failure: {shutdown}");
        }
        return Err(e.into());
    }

    match args.duration {
        Some(secs) => {
            info!("Running for {secs} s");
            if !stop.wait_timeout(Duration::from_secs(secs)) {
                info!("Run duration elapsed");
            }
        }
        None => stop.wait(),
    }

    let report = simulation.shutdown(true)?;
    info!(
        "Final mode={} q={:.2} control_cycles={} faults={}",
        report.final_mode,
        report.quantity,
        report.control_cycles,
        report.faults.total()
    );
    info!("physics: {}", report.physics_stats);
    info!("control: {}", report.control_stats);
    Ok(())
}

/// Setup tracing subscriber from CLI arguments and the configured level.
fn setup_tracing(args: &Args, config: Option<&BoilerConfig>) {
    let directive = if args.verbose {
        "debug"
    } else {
        config.map_or("info", |c| c.log_level.as_directive())
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}

