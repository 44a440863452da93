//! # Arcdash Sim
//!
//! Headless harness for the dash ability. Loads `arcdash.toml` (or the path
//! given as the first argument), runs the scenario and prints a JSON report
//! on stdout. `arcdash-sim --init` writes the default config instead.
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod scenario;

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{SimConfig, CONFIG_FILE};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("arcdash=info".parse()?))
        .init();

    info!("Arcdash sim {}", env!("CARGO_PKG_VERSION"));

    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("--init") {
        SimConfig::default()
            .save_to(CONFIG_FILE)
            .with_context(|| format!("failed to write {CONFIG_FILE}"))?;
        return Ok(());
    }

    let path = arg.map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    let config = SimConfig::load_from(&path);

    let report = scenario::run(&config).context("invalid dash configuration")?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
