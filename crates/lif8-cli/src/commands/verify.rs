//! Conformance replay of recorded traces

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use lif8_core::{reference_trace, Trace};

use super::{pick_format, FormatArg, PolicyArg};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// Replay a trace against the model
#[derive(Args, Debug)]
pub struct VerifyCommand {
    /// Trace file to replay
    #[arg(required_unless_present = "reference")]
    pub trace: Option<PathBuf>,

    /// Check the built-in reference scenario instead of a file
    #[arg(long, conflicts_with = "trace")]
    pub reference: bool,

    /// Replay under a different post-spike policy than the one recorded
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Trace encoding (default: by extension, then config)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,
}

impl VerifyCommand {
    fn load(&self, config: &CliConfig) -> CliResult<(String, Trace)> {
        match (&self.trace, self.reference) {
            (_, true) => Ok(("reference scenario".to_string(), reference_trace())),
            (Some(path), false) => {
                let format = pick_format(self.format, path, config);
                let trace = Trace::read_from(path, format)
                    .with_context(|| format!("failed to load trace {}", path.display()))?;
                Ok((path.display().to_string(), trace))
            }
            (None, false) => Err(CliError::invalid_args("a trace file or --reference is required")),
        }
    }

    pub fn execute(self, config: &CliConfig) -> CliResult<()> {
        let (name, mut trace) = self.load(config)?;
        if let Some(policy) = self.policy {
            trace.config.policy = policy.into();
        }

        info!(
            "Replaying {} ({} cycles, threshold {}, {})",
            name,
            trace.len(),
            trace.config.threshold,
            trace.config.policy
        );
        let report = trace.replay()?;

        println!(
            "OK: {} cycles, {} spikes, {} reset cycles",
            report.cycles, report.spikes, report.resets
        );
        Ok(())
    }
}
