//! Cycle-by-cycle traces and conformance replay
//!
//! A trace records, per cycle, the bus inputs and the outputs the core
//! presented. Replaying a trace re-drives a fresh [`ClockedNeuron`] with the
//! recorded inputs and checks every output.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clocked::{ClockedNeuron, CycleInput, CycleOutput};
use crate::error::*;
use crate::neuron::{DrivingCurrent, MembranePotential, NeuronConfig, NeuronCore};

/// One cycle of bus activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Cycle number, starting at 0
    pub cycle_index: u64,
    /// Driving current presented this cycle
    pub current_in: DrivingCurrent,
    /// Whether reset was held this cycle
    pub reset_asserted: bool,
    /// Registered potential output
    pub potential_out: MembranePotential,
    /// Combinational spike output
    pub spike_out: bool,
}

impl TraceRecord {
    /// Combine a cycle's input and output
    pub fn from_cycle(cycle_index: u64, input: CycleInput, output: CycleOutput) -> Self {
        Self {
            cycle_index,
            current_in: input.current,
            reset_asserted: input.reset,
            potential_out: output.potential,
            spike_out: output.spike,
        }
    }

    /// Input half of the record
    pub fn input(&self) -> CycleInput {
        CycleInput {
            current: self.current_in,
            reset: self.reset_asserted,
        }
    }
}

/// On-disk encoding of a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceFormat {
    /// Pretty-printed JSON
    Json,
    /// Compact bincode
    Bincode,
}

impl TraceFormat {
    /// `.json` files are JSON, anything else bincode
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Bincode,
        }
    }
}

/// Summary of a successful replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplayReport {
    /// Cycles checked
    pub cycles: u64,
    /// Spikes seen
    pub spikes: u64,
    /// Cycles with reset held
    pub resets: u64,
}

/// A recorded run together with the configuration that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    /// Neuron configuration for replay
    pub config: NeuronConfig,
    /// Per-cycle records, in cycle order
    pub records: Vec<TraceRecord>,
}

impl Trace {
    /// Empty trace for a configuration
    pub fn new(config: NeuronConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
        }
    }

    /// Append a record
    pub fn push(&mut self, record: TraceRecord) {
        self.records.push(record);
    }

    /// Number of recorded cycles
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no cycles are recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cycles on which a spike was output
    pub fn spike_cycles(&self) -> Vec<u64> {
        self.records
            .iter()
            .filter(|r| r.spike_out)
            .map(|r| r.cycle_index)
            .collect()
    }

    /// Check structure: valid config, cycle indices contiguous from the first
    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;
        if let Some(first) = self.records.first() {
            for (offset, record) in self.records.iter().enumerate() {
                let expected = first.cycle_index + offset as u64;
                if record.cycle_index != expected {
                    return Err(LifError::invalid_trace(format!(
                        "cycle index {} at position {}, expected {}",
                        record.cycle_index, offset, expected
                    )));
                }
            }
        }
        Ok(())
    }

    /// Re-drive a fresh neuron with the recorded inputs and compare outputs.
    ///
    /// Fails at the first diverging cycle.
    pub fn replay(&self) -> Result<ReplayReport> {
        self.validate()?;
        let mut neuron = ClockedNeuron::new(NeuronCore::new(self.config)?);
        let mut report = ReplayReport::default();

        for record in &self.records {
            let out = neuron.tick(record.input());
            if out.potential != record.potential_out {
                return Err(LifError::trace_mismatch(
                    record.cycle_index,
                    "potential_out",
                    record.potential_out,
                    out.potential,
                ));
            }
            if out.spike != record.spike_out {
                return Err(LifError::trace_mismatch(
                    record.cycle_index,
                    "spike_out",
                    record.spike_out,
                    out.spike,
                ));
            }
            report.cycles += 1;
            report.spikes += u64::from(out.spike);
            report.resets += u64::from(record.reset_asserted);
        }

        log::debug!(
            "Replayed {} cycles ({} spikes, {} reset cycles)",
            report.cycles,
            report.spikes,
            report.resets
        );
        Ok(report)
    }

    /// Encode to bytes
    pub fn encode(&self, format: TraceFormat) -> Result<Vec<u8>> {
        match format {
            TraceFormat::Json => Ok(serde_json::to_vec_pretty(self)?),
            TraceFormat::Bincode => Ok(bincode::serialize(self)?),
        }
    }

    /// Decode from bytes
    pub fn decode(bytes: &[u8], format: TraceFormat) -> Result<Self> {
        let trace: Self = match format {
            TraceFormat::Json => serde_json::from_slice(bytes)?,
            TraceFormat::Bincode => bincode::deserialize(bytes)?,
        };
        trace.validate()?;
        Ok(trace)
    }

    /// Write to a file, creating parent directories
    pub fn write_to(&self, path: &Path, format: TraceFormat) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut writer = BufWriter::new(File::create(path)?);
        match format {
            TraceFormat::Json => serde_json::to_writer_pretty(&mut writer, self)?,
            TraceFormat::Bincode => bincode::serialize_into(&mut writer, self)?,
        }
        writer.flush()?;
        Ok(())
    }

    /// Read from a file
    pub fn read_from(path: &Path, format: TraceFormat) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let trace: Self = match format {
            TraceFormat::Json => serde_json::from_reader(reader)?,
            TraceFormat::Bincode => bincode::deserialize_from(reader)?,
        };
        trace.validate()?;
        Ok(trace)
    }
}

/// Reference scenario: reset held for cycles 0-1, then 20, 20, 20, 150, 150,
/// 150, 150 and a final idle cycle, with the default spike-resetting core.
pub fn reference_trace() -> Trace {
    // (current_in, reset_asserted, potential_out, spike_out)
    const ROWS: [(u8, bool, u8, bool); 10] = [
        (0, true, 0, false),
        (0, true, 0, false),
        (20, false, 0, false),
        (20, false, 20, false),
        (20, false, 30, false),
        (150, false, 35, false),
        (150, false, 167, true),
        (150, false, 0, false),
        (150, false, 150, true),
        (0, false, 0, false),
    ];

    let records = ROWS
        .iter()
        .enumerate()
        .map(|(cycle, &(current_in, reset_asserted, potential_out, spike_out))| TraceRecord {
            cycle_index: cycle as u64,
            current_in,
            reset_asserted,
            potential_out,
            spike_out,
        })
        .collect();

    Trace {
        config: NeuronConfig::default(),
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neuron::SpikePolicy;
    use tempfile::tempdir;

    #[test]
    fn test_reference_trace_replays() {
        let report = reference_trace().replay().unwrap();
        assert_eq!(report.cycles, 10);
        assert_eq!(report.spikes, 2);
        assert_eq!(report.resets, 2);
    }

    #[test]
    fn test_reference_trace_fails_non_resetting() {
        let mut trace = reference_trace();
        trace.config = trace.config.with_policy(SpikePolicy::NonResetting);
        let err = trace.replay().unwrap_err();
        // 233 is kept, so cycle 7 reads it back
        match err {
            LifError::TraceMismatch { cycle, field, expected, found } => {
                assert_eq!(cycle, 7);
                assert_eq!(field, "potential_out");
                assert_eq!(expected, "0");
                assert_eq!(found, "233");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_tampered_spike_detected() {
        let mut trace = reference_trace();
        trace.records[8].spike_out = false;
        assert!(matches!(
            trace.replay(),
            Err(LifError::TraceMismatch { cycle: 8, field: "spike_out", .. })
        ));
    }

    #[test]
    fn test_gap_in_cycles_rejected() {
        let mut trace = reference_trace();
        trace.records.remove(3);
        assert!(matches!(trace.validate(), Err(LifError::InvalidTrace { .. })));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(TraceFormat::from_path(Path::new("run.json")), TraceFormat::Json);
        assert_eq!(TraceFormat::from_path(Path::new("run.JSON")), TraceFormat::Json);
        assert_eq!(TraceFormat::from_path(Path::new("run.bin")), TraceFormat::Bincode);
        assert_eq!(TraceFormat::from_path(Path::new("run")), TraceFormat::Bincode);
    }

    #[test]
    fn test_file_roundtrip_both_formats() {
        let tmp = tempdir().unwrap();
        let trace = reference_trace();
        let cases = [
            ("t.json", TraceFormat::Json),
            ("nested/t.bin", TraceFormat::Bincode),
        ];
        for (name, format) in cases {
            let path = tmp.path().join(name);
            trace.write_to(&path, format).unwrap();
            assert_eq!(Trace::read_from(&path, format).unwrap(), trace);
        }
    }

    #[test]
    fn test_json_field_names() {
        let json = String::from_utf8(reference_trace().encode(TraceFormat::Json).unwrap()).unwrap();
        for field in ["cycle_index", "current_in", "reset_asserted", "potential_out", "spike_out"] {
            assert!(json.contains(field), "missing {field}");
        }
        assert!(json.contains("\"spike-resetting\""));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            Trace::decode(b"not a trace", TraceFormat::Json),
            Err(LifError::Serialization { .. })
        ));
    }
}
