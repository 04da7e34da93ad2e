//! Firing behaviour over every constant input current

use clap::Args;
use std::path::PathBuf;
use tracing::info;

use lif8_core::{firing_onset, sweep, SweepEntry};

use super::PolicyArg;
use crate::config::CliConfig;
use crate::error::CliResult;

/// Sweep all input currents
#[derive(Args, Debug)]
pub struct SweepCommand {
    /// Post-spike register behaviour
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Firing threshold
    #[arg(long)]
    pub threshold: Option<u8>,

    /// Only list currents that keep the neuron firing
    #[arg(long)]
    pub firing_only: bool,

    /// Write JSON results to this file instead of printing a table
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl SweepCommand {
    pub fn execute(self, config: &CliConfig) -> CliResult<()> {
        let mut neuron = config.neuron;
        if let Some(policy) = self.policy {
            neuron.policy = policy.into();
        }
        if let Some(threshold) = self.threshold {
            neuron.threshold = threshold;
        }

        let entries: Vec<SweepEntry> = sweep(neuron)?
            .into_iter()
            .filter(|e| !self.firing_only || e.profile.fires())
            .collect();

        match firing_onset(neuron)? {
            Some(current) => info!("Firing onset at current {}", current),
            None => info!("No constant current keeps the neuron firing"),
        }

        match &self.output {
            Some(path) => {
                let json = serde_json::json!({
                    "threshold": neuron.threshold,
                    "policy": neuron.policy,
                    "entries": entries,
                });
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                std::fs::write(path, serde_json::to_string_pretty(&json)?)?;
                info!("Wrote {} sweep rows to {}", entries.len(), path.display());
            }
            None => {
                println!(
                    "{:>7} {:>9} {:>6} {:>6} {:>6} {:>7}",
                    "current", "transient", "period", "spikes", "rate", "settles"
                );
                for e in &entries {
                    let settles = e
                        .profile
                        .steady_state
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:>7} {:>9} {:>6} {:>6} {:>6.3} {:>7}",
                        e.current,
                        e.profile.transient,
                        e.profile.period,
                        e.profile.spikes_per_period,
                        e.profile.rate(),
                        settles
                    );
                }
            }
        }

        Ok(())
    }
}
