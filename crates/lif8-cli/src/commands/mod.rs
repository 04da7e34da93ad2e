//! CLI command implementations for lif8

use clap::{Parser, Subcommand, ValueEnum};
use lif8_core::{SpikePolicy, TraceFormat};
use std::path::PathBuf;

use crate::config::CliConfig;
use crate::error::CliResult;

pub mod inspect;
pub mod run;
pub mod sweep;
pub mod verify;

/// lif8 - 8-bit leaky integrate-and-fire neuron core model
#[derive(Parser, Debug)]
#[command(
    name = "lif8",
    version,
    about = "Cycle-accurate 8-bit LIF neuron core model",
    long_about = "lif8 drives a model of an 8-bit leaky integrate-and-fire neuron core \
                  cycle by cycle, records bus traces, replays them for conformance and \
                  sweeps its firing behaviour over every input current."
)]
pub struct Lif8Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "LIF8_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Simulate the neuron and optionally write a trace
    #[command(alias = "sim")]
    Run(run::RunCommand),

    /// Replay a trace and check every cycle
    Verify(verify::VerifyCommand),

    /// Firing profile for every constant input current
    Sweep(sweep::SweepCommand),

    /// Summarize a trace file
    Inspect(inspect::InspectCommand),
}

/// Post-spike register behaviour
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Clear the register on the spiking step
    SpikeResetting,
    /// Keep the integrated value
    NonResetting,
}

impl From<PolicyArg> for SpikePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::SpikeResetting => SpikePolicy::SpikeResetting,
            PolicyArg::NonResetting => SpikePolicy::NonResetting,
        }
    }
}

/// Trace file encoding
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Pretty-printed JSON
    Json,
    /// Compact bincode
    Bincode,
}

impl From<FormatArg> for TraceFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => TraceFormat::Json,
            FormatArg::Bincode => TraceFormat::Bincode,
        }
    }
}

/// Explicit flag, then `.json` extension, then the configured default,
/// then the core's own extension inference
pub(crate) fn pick_format(
    explicit: Option<FormatArg>,
    path: &std::path::Path,
    config: &CliConfig,
) -> TraceFormat {
    let inferred = TraceFormat::from_path(path);
    match explicit {
        Some(format) => format.into(),
        None if inferred == TraceFormat::Json => TraceFormat::Json,
        None => config.preferences.trace_format.unwrap_or(inferred),
    }
}

impl Lif8Cli {
    /// Log filter implied by flags and config
    pub fn log_filter(&self, config: &CliConfig) -> String {
        if self.verbose {
            "debug".to_string()
        } else {
            config.log_level.clone().unwrap_or_else(|| "info".to_string())
        }
    }

    /// Execute the CLI command
    pub fn execute(self, config: CliConfig) -> CliResult<()> {
        match self.command {
            Commands::Run(cmd) => cmd.execute(&config),
            Commands::Verify(cmd) => cmd.execute(&config),
            Commands::Sweep(cmd) => cmd.execute(&config),
            Commands::Inspect(cmd) => cmd.execute(&config),
        }
    }
}
