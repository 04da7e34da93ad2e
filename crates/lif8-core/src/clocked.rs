//! Cycle-level view of the neuron core as seen from its bus.
//!
//! Per cycle the bus presents an 8-bit current and an active-low reset. The
//! potential output is the register, so it shows the value committed at the
//! end of the previous cycle. The spike output is combinational and belongs to
//! the same cycle as the current that produced it.

use serde::{Deserialize, Serialize};

use crate::neuron::{DrivingCurrent, MembranePotential, NeuronCore};

/// Inputs sampled during one clock cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CycleInput {
    /// Driving current on the input bus
    pub current: DrivingCurrent,
    /// Reset asserted for this cycle
    pub reset: bool,
}

impl CycleInput {
    /// Ordinary cycle with the given current
    pub fn drive(current: DrivingCurrent) -> Self {
        Self { current, reset: false }
    }

    /// Cycle with reset held
    pub fn reset() -> Self {
        Self { current: 0, reset: true }
    }

    /// Build from bus levels; `rst_n` is active-low
    pub fn from_pins(current: DrivingCurrent, rst_n: bool) -> Self {
        Self { current, reset: !rst_n }
    }
}

/// Outputs observed during one clock cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CycleOutput {
    /// Registered potential (previous commit)
    pub potential: MembranePotential,
    /// Combinational spike flag
    pub spike: bool,
}

/// A [`NeuronCore`] driven one clock cycle at a time
#[derive(Debug, Clone, Default)]
pub struct ClockedNeuron {
    core: NeuronCore,
    cycle: u64,
}

impl ClockedNeuron {
    /// Wrap a core; its register value is kept as-is
    pub fn new(core: NeuronCore) -> Self {
        Self { core, cycle: 0 }
    }

    /// Apply one clock cycle.
    ///
    /// Reset wins: while it is held the register reads 0, no spike is
    /// produced and the ordinary update is skipped.
    pub fn tick(&mut self, input: CycleInput) -> CycleOutput {
        self.cycle += 1;

        if input.reset {
            self.core.reset();
            return CycleOutput {
                potential: 0,
                spike: false,
            };
        }

        let potential = self.core.potential();
        let (_, spike) = self.core.step(input.current);
        CycleOutput { potential, spike }
    }

    /// Asynchronous reset between cycles; visible to the next read.
    pub fn assert_reset(&mut self) {
        self.core.reset();
    }

    /// Register output right now
    pub fn potential(&self) -> MembranePotential {
        self.core.potential()
    }

    /// Number of cycles applied
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Underlying core
    pub fn core(&self) -> &NeuronCore {
        &self.core
    }
}
