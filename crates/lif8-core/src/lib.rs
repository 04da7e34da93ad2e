//! Cycle-accurate model of an 8-bit leaky integrate-and-fire neuron core
//!
//! The core is a single 8-bit register updated once per clock cycle:
//! it halves (leak), adds the driving current with wrap-around (integrate)
//! and raises a one-cycle spike when the result reaches the threshold.
//! Around it this crate provides the bus-level clocked view, a stimulus
//! driven simulation engine, a trace format for conformance replay and
//! analysis of the long-run firing behaviour.

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod error;
pub mod neuron;
pub mod clocked;
pub mod simulation;
pub mod trace;
pub mod analysis;

// Re-export essential types
pub use error::{LifError, Result};
pub use neuron::{
    leak_integrate, DrivingCurrent, MembranePotential, NeuronConfig, NeuronCore, SpikePolicy,
    DEFAULT_THRESHOLD,
};
pub use clocked::{ClockedNeuron, CycleInput, CycleOutput};
pub use simulation::{run_constant, SimulationEngine, SimulationParams, SimulationResult, Stimulus};
pub use trace::{reference_trace, ReplayReport, Trace, TraceFormat, TraceRecord};
pub use analysis::{firing_onset, firing_profile, steady_state, sweep, FiringProfile, SweepEntry};
