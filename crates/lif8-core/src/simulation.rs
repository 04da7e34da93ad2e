//! Stimulus-driven simulation of a single clocked neuron

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    clocked::{ClockedNeuron, CycleInput},
    error::*,
    neuron::{DrivingCurrent, MembranePotential, NeuronConfig, NeuronCore},
    trace::{Trace, TraceRecord},
};

/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Number of clock cycles to run
    pub cycles: u64,
    /// Seed for random stimuli
    pub seed: u64,
    /// Record a per-cycle trace
    pub record_trace: bool,
    /// Maximum spikes to record (recording stops, the run continues)
    pub max_recorded_spikes: Option<usize>,
    /// Enable performance sampling
    pub perf_enabled: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            cycles: 16,
            seed: 42,
            record_trace: true,
            max_recorded_spikes: Some(1_000_000),
            perf_enabled: false,
        }
    }
}

impl SimulationParams {
    /// Create new simulation parameters with validation
    pub fn new(cycles: u64) -> Result<Self> {
        if cycles == 0 {
            return Err(LifError::invalid_parameter(
                "cycles",
                cycles.to_string(),
                "> 0",
            ));
        }
        Ok(Self {
            cycles,
            ..Default::default()
        })
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable trace recording
    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.record_trace = enabled;
        self
    }

    /// Set maximum spike recording limit
    pub fn with_spike_limit(mut self, limit: usize) -> Self {
        self.max_recorded_spikes = Some(limit);
        self
    }

    /// Enable or disable performance sampling
    pub fn with_perf(mut self, enabled: bool) -> Self {
        self.perf_enabled = enabled;
        self
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        Self::new(self.cycles)?;
        Ok(())
    }
}

/// Per-cycle input source.
///
/// Windows are `[start, start + duration)` in cycles. When several current
/// sources are active in one cycle their values are summed modulo 256, the
/// same truncation the 8-bit input bus applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Stimulus {
    /// Hold reset
    Reset {
        /// First cycle
        start: u64,
        /// Number of cycles
        duration: u64,
    },
    /// Constant current
    Constant {
        /// Current value
        current: DrivingCurrent,
        /// First cycle
        start: u64,
        /// Number of cycles
        duration: u64,
    },
    /// Scripted values, one per cycle
    Sequence {
        /// First cycle
        start: u64,
        /// Values for consecutive cycles
        currents: Vec<DrivingCurrent>,
    },
    /// Uniform random current in `[0, max]`, drawn from the seeded generator
    Random {
        /// Largest value drawn
        max: DrivingCurrent,
        /// First cycle
        start: u64,
        /// Number of cycles
        duration: u64,
    },
}

impl Stimulus {
    fn window_contains(start: u64, duration: u64, cycle: u64) -> bool {
        cycle >= start && cycle - start < duration
    }

    /// Whether this source holds reset on `cycle`
    pub fn resets_at(&self, cycle: u64) -> bool {
        match self {
            Self::Reset { start, duration } => Self::window_contains(*start, *duration, cycle),
            _ => false,
        }
    }

    /// Current contributed on `cycle`, if any
    fn current_at(&self, cycle: u64, rng: &mut StdRng) -> Option<DrivingCurrent> {
        match self {
            Self::Reset { .. } => None,
            Self::Constant { current, start, duration } => {
                Self::window_contains(*start, *duration, cycle).then_some(*current)
            }
            Self::Sequence { start, currents } => cycle
                .checked_sub(*start)
                .and_then(|offset| usize::try_from(offset).ok())
                .and_then(|offset| currents.get(offset).copied()),
            Self::Random { max, start, duration } => {
                Self::window_contains(*start, *duration, cycle).then(|| rng.gen_range(0..=*max))
            }
        }
    }
}

/// Performance metrics collected during simulation steps.
/// Present when `SimulationParams::with_perf(true)` is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerfReport {
    /// Average step time in nanoseconds
    pub avg_step_ns: u64,
    /// Max step time in nanoseconds
    pub max_step_ns: u64,
    /// Steps sampled
    pub steps: usize,
}

/// Simulation results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    /// Per-cycle trace (empty when recording is disabled)
    pub trace: Trace,
    /// Cycles on which a spike was output
    pub spike_cycles: Vec<u64>,
    /// Number of cycles executed
    pub cycles_executed: u64,
    /// Total spike count, including spikes past the recording limit
    pub total_spikes: u64,
    /// Register value after the last cycle
    pub final_potential: MembranePotential,
    /// Optional performance report
    pub perf: Option<PerfReport>,
}

impl SimulationResult {
    fn new(config: NeuronConfig) -> Self {
        Self {
            trace: Trace::new(config),
            spike_cycles: Vec::new(),
            cycles_executed: 0,
            total_spikes: 0,
            final_potential: 0,
            perf: None,
        }
    }

    /// Spikes per cycle
    pub fn firing_rate(&self) -> f64 {
        if self.cycles_executed == 0 {
            return 0.0;
        }
        self.total_spikes as f64 / self.cycles_executed as f64
    }

    /// Mean distance between consecutive recorded spikes, in cycles
    pub fn mean_interspike_interval(&self) -> Option<f64> {
        if self.spike_cycles.len() < 2 {
            return None;
        }
        let span = self.spike_cycles[self.spike_cycles.len() - 1] - self.spike_cycles[0];
        Some(span as f64 / (self.spike_cycles.len() - 1) as f64)
    }
}

/// Simulation engine
#[derive(Debug)]
pub struct SimulationEngine {
    neuron: ClockedNeuron,
    params: SimulationParams,
    stimuli: Vec<Stimulus>,
    perf_samples: Vec<u64>,
}

impl SimulationEngine {
    /// Create a new simulation engine
    pub fn new(config: NeuronConfig, params: SimulationParams) -> Result<Self> {
        params.validate()?;
        let neuron = ClockedNeuron::new(NeuronCore::new(config)?);

        Ok(Self {
            neuron,
            params,
            stimuli: Vec::new(),
            perf_samples: Vec::new(),
        })
    }

    /// Add an input stimulus
    pub fn add_stimulus(&mut self, stimulus: Stimulus) {
        self.stimuli.push(stimulus);
    }

    /// Add several stimuli
    pub fn with_stimuli(mut self, stimuli: impl IntoIterator<Item = Stimulus>) -> Self {
        self.stimuli.extend(stimuli);
        self
    }

    /// Inputs for one cycle
    fn input_at(&self, cycle: u64, rng: &mut StdRng) -> CycleInput {
        let reset = self.stimuli.iter().any(|s| s.resets_at(cycle));
        let current = self
            .stimuli
            .iter()
            .filter_map(|s| s.current_at(cycle, rng))
            .fold(0u8, |acc, c| acc.wrapping_add(c));
        CycleInput { current, reset }
    }

    /// Run the complete simulation.
    ///
    /// The neuron starts from a cleared register and the generator from the
    /// configured seed, so repeated runs give identical results.
    pub fn run(&mut self) -> Result<SimulationResult> {
        let config = self.neuron.core().config();
        log::info!(
            "Starting simulation: {} cycles, threshold {}, {}",
            self.params.cycles,
            config.threshold,
            config.policy
        );

        self.neuron = ClockedNeuron::new(NeuronCore::new(config)?);
        self.perf_samples.clear();
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let mut results = SimulationResult::new(config);
        let mut limit_logged = false;

        let num_steps = self.params.cycles;
        for cycle in 0..num_steps {
            let step_start = Instant::now();

            let input = self.input_at(cycle, &mut rng);
            let output = self.neuron.tick(input);

            if output.spike {
                results.total_spikes += 1;
                log::debug!("Spike at cycle {} (potential {})", cycle, output.potential);

                let under_limit = self
                    .params
                    .max_recorded_spikes
                    .map_or(true, |max| results.spike_cycles.len() < max);
                if under_limit {
                    results.spike_cycles.push(cycle);
                } else if !limit_logged {
                    log::warn!("Spike recording limit reached at cycle {}", cycle);
                    limit_logged = true;
                }
            }

            if self.params.record_trace {
                results.trace.push(TraceRecord::from_cycle(cycle, input, output));
            }

            if self.params.perf_enabled {
                self.perf_samples.push(step_start.elapsed().as_nanos() as u64);
            }

            if cycle % (num_steps / 10).max(1) == 0 {
                let progress = (cycle as f32 / num_steps as f32) * 100.0;
                log::debug!("Simulation progress: {:.1}%", progress);
            }
        }

        results.cycles_executed = num_steps;
        results.final_potential = self.neuron.potential();

        log::info!(
            "Simulation completed: {} spikes in {} cycles",
            results.total_spikes,
            results.cycles_executed
        );

        if self.params.perf_enabled && !self.perf_samples.is_empty() {
            let steps = self.perf_samples.len();
            let sum: u128 = self.perf_samples.iter().map(|v| *v as u128).sum();
            let avg = (sum / steps as u128) as u64;
            let max = self.perf_samples.iter().copied().max().unwrap_or(0);
            results.perf = Some(PerfReport {
                avg_step_ns: avg,
                max_step_ns: max,
                steps,
            });
        }

        Ok(results)
    }

    /// Simulation parameters
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Configured stimuli
    pub fn stimuli(&self) -> &[Stimulus] {
        &self.stimuli
    }

    /// Neuron being driven
    pub fn neuron(&self) -> &ClockedNeuron {
        &self.neuron
    }
}

/// Drive a constant current from a cleared register for `cycles` cycles
pub fn run_constant(
    config: NeuronConfig,
    current: DrivingCurrent,
    cycles: u64,
) -> Result<SimulationResult> {
    let params = SimulationParams::new(cycles)?;
    let mut engine = SimulationEngine::new(config, params)?;
    engine.add_stimulus(Stimulus::Constant {
        current,
        start: 0,
        duration: cycles,
    });
    engine.run()
}
