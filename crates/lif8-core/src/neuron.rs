//! The 8-bit leaky integrate-and-fire neuron core
//!
//! One register, one update rule:
//!
//! ```text
//! next  = (potential >> 1) + current   (mod 256)
//! spike = next >= threshold
//! ```
//!
//! What happens to the register after a spike is a construction-time choice
//! between two [`SpikePolicy`] variants. The two variants exist because the
//! reference designs disagree: one clears the register after every spike, the
//! other behaves as a non-resetting integrator. Neither is treated as the
//! "correct" one.

use serde::{Deserialize, Serialize};

use crate::error::*;

/// Membrane potential register value, [0, 255]
pub type MembranePotential = u8;

/// External driving value, [0, 255]
pub type DrivingCurrent = u8;

/// Default firing threshold
pub const DEFAULT_THRESHOLD: MembranePotential = 200;

/// Leak then integrate, with 8-bit wrap-around.
///
/// The sum is truncated, not saturated: `leak_integrate(255, 255)` is
/// `(127 + 255) mod 256 = 126`.
#[inline]
pub fn leak_integrate(potential: MembranePotential, current: DrivingCurrent) -> MembranePotential {
    (potential >> 1).wrapping_add(current)
}

/// What the register does after a spike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpikePolicy {
    /// Register is cleared to 0 on the step that spikes
    #[default]
    SpikeResetting,
    /// Register keeps the integrated value; the spike does not touch it
    NonResetting,
}

impl SpikePolicy {
    /// Whether a spike clears the register
    pub fn resets_on_spike(self) -> bool {
        matches!(self, Self::SpikeResetting)
    }

    /// Stable name used in config files and trace metadata
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SpikeResetting => "spike-resetting",
            Self::NonResetting => "non-resetting",
        }
    }
}

impl std::fmt::Display for SpikePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SpikePolicy {
    type Err = LifError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "spike-resetting" => Ok(Self::SpikeResetting),
            "non-resetting" => Ok(Self::NonResetting),
            other => Err(LifError::invalid_parameter(
                "policy",
                other,
                "spike-resetting | non-resetting",
            )),
        }
    }
}

/// Construction-time configuration of a neuron core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuronConfig {
    /// Firing threshold, fixed for the lifetime of the core
    pub threshold: MembranePotential,
    /// Post-spike register behaviour
    pub policy: SpikePolicy,
}

impl Default for NeuronConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            policy: SpikePolicy::SpikeResetting,
        }
    }
}

impl NeuronConfig {
    /// Create a new configuration with validation
    pub fn new(threshold: MembranePotential, policy: SpikePolicy) -> Result<Self> {
        if threshold == 0 {
            return Err(LifError::invalid_parameter(
                "threshold",
                threshold.to_string(),
                "> 0",
            ));
        }
        Ok(Self { threshold, policy })
    }

    /// Same threshold, different policy
    pub fn with_policy(mut self, policy: SpikePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        Self::new(self.threshold, self.policy)?;
        Ok(())
    }
}

/// Single-register LIF neuron.
///
/// The register starts at 0; a core that has never been reset reads 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeuronCore {
    potential: MembranePotential,
    config: NeuronConfig,
}

impl Default for NeuronCore {
    fn default() -> Self {
        Self {
            potential: 0,
            config: NeuronConfig::default(),
        }
    }
}

impl NeuronCore {
    /// Create a new core with a validated configuration
    pub fn new(config: NeuronConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { potential: 0, config })
    }

    /// Clear the register. Idempotent.
    #[inline]
    pub fn reset(&mut self) {
        self.potential = 0;
    }

    /// Advance one time step.
    ///
    /// Returns the committed register value and whether the step spiked.
    #[inline]
    pub fn step(&mut self, current: DrivingCurrent) -> (MembranePotential, bool) {
        let next = leak_integrate(self.potential, current);
        let spike = next >= self.config.threshold;
        let state_after = if spike && self.config.policy.resets_on_spike() {
            0
        } else {
            next
        };
        self.potential = state_after;
        (state_after, spike)
    }

    /// Advance one step with a wider input.
    ///
    /// Only the low 8 bits of `current` reach the register, as on a fixed
    /// 8-bit input bus: `step_wide(0x1_2C)` drives 44.
    #[inline]
    pub fn step_wide(&mut self, current: u32) -> (MembranePotential, bool) {
        self.step((current & 0xFF) as DrivingCurrent)
    }

    /// Spike flag the next `step(current)` would produce, without committing
    #[inline]
    pub fn would_spike(&self, current: DrivingCurrent) -> bool {
        leak_integrate(self.potential, current) >= self.config.threshold
    }

    /// Current register value
    pub fn potential(&self) -> MembranePotential {
        self.potential
    }

    /// Firing threshold
    pub fn threshold(&self) -> MembranePotential {
        self.config.threshold
    }

    /// Post-spike policy
    pub fn policy(&self) -> SpikePolicy {
        self.config.policy
    }

    /// Full configuration
    pub fn config(&self) -> NeuronConfig {
        self.config
    }
}
