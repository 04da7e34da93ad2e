//! Long-run behaviour under constant drive.
//!
//! With a fixed current the core is a deterministic map on 256 states, so the
//! orbit from a cleared register always ends in a cycle within 256 steps.
//!
//! Note that wrap-around can starve a strongly driven neuron: with the default
//! threshold and reset-on-spike, a current of 180 takes the register from 180
//! to 14 instead of past the threshold, and the orbit settles into a
//! non-firing 18/189 cycle.

use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::*;
use crate::neuron::{DrivingCurrent, MembranePotential, NeuronConfig, NeuronCore};

/// Shape of the orbit from potential 0 under a constant current
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FiringProfile {
    /// Steps before the orbit enters its cycle
    pub transient: usize,
    /// Cycle length in steps
    pub period: usize,
    /// Spikes emitted per trip round the cycle
    pub spikes_per_period: usize,
    /// Register value held when the cycle is a single non-spiking state
    pub steady_state: Option<MembranePotential>,
}

impl FiringProfile {
    /// Whether the neuron keeps firing
    pub fn fires(&self) -> bool {
        self.spikes_per_period > 0
    }

    /// Long-run spikes per step
    pub fn rate(&self) -> f64 {
        self.spikes_per_period as f64 / self.period as f64
    }
}

/// One row of a current sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepEntry {
    /// Constant drive
    pub current: DrivingCurrent,
    /// Resulting orbit
    pub profile: FiringProfile,
}

/// Orbit of a cleared core under constant `current`
pub fn firing_profile(config: NeuronConfig, current: DrivingCurrent) -> Result<FiringProfile> {
    Ok(orbit(&NeuronCore::new(config)?, current))
}

fn orbit(template: &NeuronCore, current: DrivingCurrent) -> FiringProfile {
    let mut core = template.clone();
    core.reset();
    let mut first_seen = [None::<usize>; 256];
    let mut states = Vec::with_capacity(257);
    let mut spikes = Vec::with_capacity(257);

    loop {
        let step = states.len();
        let potential = core.potential();
        if let Some(start) = first_seen[potential as usize] {
            let period = step - start;
            let spikes_per_period = spikes[start..].iter().filter(|s| **s).count();
            let steady_state = (period == 1 && spikes_per_period == 0).then(|| states[start]);
            return FiringProfile {
                transient: start,
                period,
                spikes_per_period,
                steady_state,
            };
        }
        first_seen[potential as usize] = Some(step);
        states.push(potential);
        let (_, spike) = core.step(current);
        spikes.push(spike);
    }
}

/// Fixed point reached from 0, if the orbit settles without firing
pub fn steady_state(
    config: NeuronConfig,
    current: DrivingCurrent,
) -> Result<Option<MembranePotential>> {
    Ok(firing_profile(config, current)?.steady_state)
}

/// Smallest constant current that keeps the neuron firing
pub fn firing_onset(config: NeuronConfig) -> Result<Option<DrivingCurrent>> {
    let template = NeuronCore::new(config)?;
    Ok((0..=u8::MAX).find(|&current| orbit(&template, current).fires()))
}

/// Firing profile for every possible current.
///
/// Each current gets its own core, so with the `parallel` feature the rows
/// are computed concurrently; order is always by current.
pub fn sweep(config: NeuronConfig) -> Result<Vec<SweepEntry>> {
    let template = NeuronCore::new(config)?;
    let row = |current: u8| SweepEntry {
        current,
        profile: orbit(&template, current),
    };

    #[cfg(feature = "parallel")]
    let entries: Vec<SweepEntry> = (0..=u8::MAX).into_par_iter().map(row).collect();
    #[cfg(not(feature = "parallel"))]
    let entries: Vec<SweepEntry> = (0..=u8::MAX).map(row).collect();

    log::debug!(
        "Swept {} currents (threshold {}, {})",
        entries.len(),
        config.threshold,
        config.policy
    );
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neuron::SpikePolicy;

    fn resetting() -> NeuronConfig {
        NeuronConfig::default()
    }

    fn non_resetting() -> NeuronConfig {
        NeuronConfig::default().with_policy(SpikePolicy::NonResetting)
    }

    fn shape(config: NeuronConfig, current: u8) -> (usize, usize, usize) {
        let p = firing_profile(config, current).unwrap();
        (p.transient, p.period, p.spikes_per_period)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = NeuronConfig {
            threshold: 0,
            policy: SpikePolicy::SpikeResetting,
        };
        assert!(firing_profile(config, 10).is_err());
        assert!(sweep(config).is_err());
    }

    #[test]
    fn test_zero_current_stays_at_rest() {
        let profile = firing_profile(resetting(), 0).unwrap();
        assert_eq!(profile.transient, 0);
        assert_eq!(profile.period, 1);
        assert_eq!(profile.steady_state, Some(0));
    }

    #[test]
    fn test_sub_threshold_settles_below_twice_current() {
        // 0, 20, 30, 35, 37, 38, 39, 39, ...
        let profile = firing_profile(resetting(), 20).unwrap();
        assert_eq!(profile.transient, 6);
        assert_eq!(profile.steady_state, Some(39));
        assert!(!profile.fires());
    }

    #[test]
    fn test_boundary_current_never_fires() {
        // 2c = 200, but the floor-shift orbit stops at 199
        assert_eq!(steady_state(resetting(), 100).unwrap(), Some(199));
        assert_eq!(steady_state(non_resetting(), 100).unwrap(), Some(199));
    }

    #[test]
    fn test_onset_current() {
        assert_eq!(firing_onset(resetting()).unwrap(), Some(101));
        assert_eq!(firing_onset(non_resetting()).unwrap(), Some(101));
    }

    #[test]
    fn test_resetting_periods() {
        // 0, 101, 151, 176, 189, 195, 198 -> 200* -> 0
        assert_eq!(shape(resetting(), 101), (0, 7, 1));
        // 0 -> 150 -> 225* -> 0
        assert_eq!(shape(resetting(), 150), (0, 2, 1));

        let profile = firing_profile(resetting(), 200).unwrap();
        assert_eq!((profile.period, profile.spikes_per_period), (1, 1));
        assert_eq!(profile.rate(), 1.0);
        assert_eq!(profile.steady_state, None);
    }

    #[test]
    fn test_non_resetting_periods() {
        // 0, 150, 225*, 6, then 153 -> 226* -> 7 -> 153
        assert_eq!(shape(non_resetting(), 150), (4, 3, 1));
        // Climbs to 200*, then holds 201 and fires every step
        assert_eq!(shape(non_resetting(), 101), (8, 1, 1));
    }

    #[test]
    fn test_wraparound_slows_strong_drive() {
        // 0 -> 255* -> 126 -> 62 -> 30 -> 14 -> 6 -> 2 -> 0
        assert_eq!(shape(non_resetting(), 255), (0, 8, 1));
    }

    #[test]
    fn test_wraparound_can_starve_firing() {
        // 0, 180, 14, 187, 17, 188, 18, 189, 18, ...
        let profile = firing_profile(resetting(), 180).unwrap();
        assert_eq!((profile.transient, profile.period), (6, 2));
        assert!(!profile.fires());
    }

    #[test]
    fn test_sweep_covers_all_currents_in_order() {
        let entries = sweep(resetting()).unwrap();
        assert_eq!(entries.len(), 256);
        assert!(entries.iter().enumerate().all(|(i, e)| e.current as usize == i));
        assert!(entries[..=100].iter().all(|e| !e.profile.fires()));
        // No wrap before the crossing below 171, and a single step reaches
        // the threshold from 200 up
        assert!(entries[101..=170].iter().all(|e| e.profile.fires()));
        assert!(entries[200..].iter().all(|e| e.profile.fires()));
        assert!(!entries[180].profile.fires());
    }
}
