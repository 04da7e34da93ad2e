//! # lif8 - Command Line Interface for the 8-bit LIF neuron core
//!
//! Simulates the core cycle by cycle, writes and replays bus traces and
//! sweeps the firing behaviour over all input currents.

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lif8_cli::config::CliConfig;
use lif8_cli::Lif8Cli;

fn main() {
    let cli = Lif8Cli::parse();

    let config = CliConfig::resolve(cli.config.as_deref());

    // Environment wins over flags and config
    let default_filter = match &config {
        Ok(config) => cli.log_filter(config),
        Err(_) => "info".to_string(),
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = config.and_then(|config| cli.execute(config));
    if let Err(err) = result {
        error!("Command failed: {}", err);
        std::process::exit(1);
    }
}
