//! Simulation command

use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

use lif8_core::{NeuronConfig, SimulationEngine, SimulationParams, SimulationResult, Stimulus};

use super::{pick_format, FormatArg, PolicyArg};
use crate::config::{CliConfig, ExperimentConfig};
use crate::error::{CliError, CliResult};

/// Simulate the neuron core
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Experiment file (.toml); replaces the constant-drive flags
    #[arg(short, long, conflicts_with_all = ["current", "reset_cycles"])]
    pub experiment: Option<PathBuf>,

    /// Constant driving current; only the low 8 bits reach the core
    #[arg(long, default_value = "20")]
    pub current: u32,

    /// Number of cycles to run
    #[arg(long)]
    pub cycles: Option<u64>,

    /// Cycles with reset held before the drive starts
    #[arg(long)]
    pub reset_cycles: Option<u64>,

    /// Post-spike register behaviour
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Firing threshold
    #[arg(long)]
    pub threshold: Option<u8>,

    /// Seed for random stimuli
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the trace to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Trace encoding (default: by extension, then config)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Do not print the per-cycle table
    #[arg(short, long)]
    pub quiet: bool,

    /// Report per-step timing
    #[arg(long)]
    pub perf: bool,
}

impl RunCommand {
    /// Neuron, parameters and stimuli after applying file, config and flags
    fn plan(
        &self,
        config: &CliConfig,
    ) -> CliResult<(NeuronConfig, SimulationParams, Vec<Stimulus>)> {
        let (mut neuron, mut params, stimuli) = match &self.experiment {
            Some(path) => {
                let experiment = ExperimentConfig::load(path)?;
                info!("Loaded experiment {}", path.display());
                (experiment.neuron, experiment.run, experiment.stimulus)
            }
            None => {
                let cycles = self.cycles.unwrap_or(SimulationParams::default().cycles);
                let reset_cycles = self
                    .reset_cycles
                    .unwrap_or(config.preferences.reset_cycles);
                if self.current > u8::MAX as u32 {
                    warn!(
                        "Current {} exceeds 8 bits; driving {}",
                        self.current,
                        self.current & 0xFF
                    );
                }
                let current = (self.current & 0xFF) as u8;
                let stimuli = vec![
                    Stimulus::Reset {
                        start: 0,
                        duration: reset_cycles,
                    },
                    Stimulus::Constant {
                        current,
                        start: reset_cycles,
                        duration: cycles.saturating_sub(reset_cycles),
                    },
                ];
                (config.neuron, SimulationParams::new(cycles)?, stimuli)
            }
        };

        if let Some(cycles) = self.cycles {
            params.cycles = cycles;
        }
        if let Some(seed) = self.seed {
            params.seed = seed;
        }
        if let Some(policy) = self.policy {
            neuron.policy = policy.into();
        }
        if let Some(threshold) = self.threshold {
            neuron.threshold = threshold;
        }
        params.perf_enabled |= self.perf;
        params.record_trace = true;

        neuron.validate()?;
        params.validate()?;
        Ok((neuron, params, stimuli))
    }

    pub fn execute(self, config: &CliConfig) -> CliResult<()> {
        let (neuron, params, stimuli) = self.plan(config)?;
        if stimuli.is_empty() {
            return Err(CliError::invalid_args("experiment defines no stimuli"));
        }

        let mut engine = SimulationEngine::new(neuron, params)?.with_stimuli(stimuli);
        let result = engine.run()?;

        if !self.quiet && config.preferences.print_table {
            print_table(&result);
        }

        info!(
            "{} spikes in {} cycles (rate {:.3}/cycle), final potential {}",
            result.total_spikes,
            result.cycles_executed,
            result.firing_rate(),
            result.final_potential
        );
        if let Some(perf) = &result.perf {
            info!(
                "Step timing: avg {}ns, max {}ns over {} steps",
                perf.avg_step_ns, perf.max_step_ns, perf.steps
            );
        }

        if let Some(path) = &self.output {
            let format = pick_format(self.format, path, config);
            result.trace.write_to(path, format)?;
            info!("Wrote {:?} trace to {}", format, path.display());
        }

        Ok(())
    }
}

fn print_table(result: &SimulationResult) {
    println!("{:>6} {:>7} {:>5} {:>9} {:>5}", "cycle", "current", "reset", "potential", "spike");
    for r in &result.trace.records {
        println!(
            "{:>6} {:>7} {:>5} {:>9} {:>5}",
            r.cycle_index,
            r.current_in,
            if r.reset_asserted { "1" } else { "0" },
            r.potential_out,
            if r.spike_out { "1" } else { "0" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lif8_core::SpikePolicy;

    fn command(args: &[&str]) -> RunCommand {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            run: RunCommand,
        }

        let mut argv = vec!["run"];
        argv.extend_from_slice(args);
        Wrapper::parse_from(argv).run
    }

    #[test]
    fn test_constant_plan() {
        let (neuron, params, stimuli) = command(&["--current", "150", "--cycles", "12"])
            .plan(&CliConfig::default())
            .unwrap();
        assert_eq!(neuron, NeuronConfig::default());
        assert_eq!(params.cycles, 12);
        assert_eq!(
            stimuli,
            vec![
                Stimulus::Reset {
                    start: 0,
                    duration: 2,
                },
                Stimulus::Constant {
                    current: 150,
                    start: 2,
                    duration: 10,
                },
            ]
        );
    }

    #[test]
    fn test_wide_current_masked() {
        let (_, _, stimuli) = command(&["--current", "300"]).plan(&CliConfig::default()).unwrap();
        assert!(matches!(stimuli[1], Stimulus::Constant { current: 44, .. }));
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = CliConfig::default();
        config.neuron.policy = SpikePolicy::NonResetting;
        let (neuron, _, _) = command(&["--policy", "spike-resetting", "--threshold", "120"])
            .plan(&config)
            .unwrap();
        assert_eq!(neuron.policy, SpikePolicy::SpikeResetting);
        assert_eq!(neuron.threshold, 120);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let result = command(&["--threshold", "0"]).plan(&CliConfig::default());
        assert!(matches!(result, Err(CliError::Core(_))));
    }
}
