//! Setup binary for Canopy.
//!
//! Validates the configuration fragments named on the command line, builds
//! the simulation grid, and loads every configured dataset onto it. The
//! process exits non-zero on the first failing stage; the cause has already
//! been logged by then.
//!
//! # Startup Sequence
//!
//! 1. Parse arguments
//! 2. Initialize structured logging (tracing)
//! 3. Run the setup sequence (see [`setup`])
//! 4. Log the summary

mod cli;
mod error;
mod setup;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::error::EngineError;

/// Application entry point.
///
/// # Errors
///
/// Returns the error of the first setup stage that fails.
fn main() -> Result<(), EngineError> {
    let args = Args::parse();
    init_logging(args.json_logs);

    info!("canopy-engine starting");
    let summary = setup::run(&args)?;
    info!(
        grid = %summary.grid,
        n_cells = summary.n_cells,
        modules = ?summary.modules,
        variables = ?summary.variables,
        "Setup complete"
    );
    Ok(())
}

/// Install the global subscriber; `RUST_LOG` overrides the `info` default.
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
