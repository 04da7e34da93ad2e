//! Trace inspection

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use lif8_core::Trace;

use super::{pick_format, FormatArg};
use crate::config::CliConfig;
use crate::error::CliResult;

/// Summarize a trace file
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Trace file
    pub trace: PathBuf,

    /// Trace encoding (default: by extension, then config)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Also list the spiking cycles
    #[arg(short, long)]
    pub detailed: bool,
}

impl InspectCommand {
    pub fn execute(self, config: &CliConfig) -> CliResult<()> {
        let format = pick_format(self.format, &self.trace, config);
        let trace = Trace::read_from(&self.trace, format)
            .with_context(|| format!("failed to load trace {}", self.trace.display()))?;
        info!("Inspecting {}", self.trace.display());

        let cycles = trace.len();
        let resets = trace.records.iter().filter(|r| r.reset_asserted).count();
        let spikes = trace.spike_cycles();
        let peak = trace.records.iter().map(|r| r.potential_out).max().unwrap_or(0);
        let rate = if cycles == 0 { 0.0 } else { spikes.len() as f64 / cycles as f64 };

        println!("threshold:     {}", trace.config.threshold);
        println!("policy:        {}", trace.config.policy);
        println!("cycles:        {}", cycles);
        println!("reset cycles:  {}", resets);
        println!("spikes:        {}", spikes.len());
        println!("firing rate:   {:.3}/cycle", rate);
        println!("peak output:   {}", peak);
        match spikes.first() {
            Some(first) => println!("first spike:   cycle {}", first),
            None => println!("first spike:   none"),
        }

        if self.detailed && !spikes.is_empty() {
            let list: Vec<String> = spikes.iter().map(|c| c.to_string()).collect();
            println!("spike cycles:  {}", list.join(", "));
        }

        Ok(())
    }
}
