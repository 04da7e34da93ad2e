//! Configuration management for the lif8 CLI

use std::path::{Path, PathBuf};

use lif8_core::{NeuronConfig, SimulationParams, Stimulus, TraceFormat};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// Global CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Default logging level
    pub log_level: Option<String>,

    /// Neuron used when no experiment file is given
    pub neuron: NeuronConfig,

    /// User preferences
    pub preferences: UserPreferences,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    /// Encoding for trace files whose extension is not `.json`;
    /// unset means bincode, the same inference the core applies
    pub trace_format: Option<TraceFormat>,

    /// Cycles with reset held before the drive starts
    pub reset_cycles: u64,

    /// Print the per-cycle table after a run
    pub print_table: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            neuron: NeuronConfig::default(),
            preferences: UserPreferences::default(),
        }
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            trace_format: None,
            reset_cycles: 2,
            print_table: true,
        }
    }
}

impl CliConfig {
    /// Load configuration from file; a missing file yields the defaults
    pub fn load_from_file(path: &Path) -> CliResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)
                .map_err(|e| CliError::config(format!("Invalid config file: {}", e)))?;
            config.neuron.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from an explicit path, or from the default location
    pub fn resolve(explicit: Option<&Path>) -> CliResult<Self> {
        match explicit {
            Some(path) if !path.exists() => Err(CliError::config(format!(
                "Config file not found: {}",
                path.display()
            ))),
            Some(path) => Self::load_from_file(path),
            None => match Self::default_config_path() {
                Ok(path) => Self::load_from_file(&path),
                Err(_) => Ok(Self::default()),
            },
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::config("Could not determine config directory"))?;
        Ok(config_dir.join("lif8").join("config.toml"))
    }
}

/// Experiment file: neuron, run parameters and stimuli
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Neuron configuration
    pub neuron: NeuronConfig,

    /// Run parameters
    pub run: SimulationParams,

    /// Stimuli, applied together
    pub stimulus: Vec<Stimulus>,
}

impl ExperimentConfig {
    /// Load and validate an experiment file
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let experiment: Self = toml::from_str(&text).map_err(|e| {
            CliError::config(format!("Invalid experiment {}: {}", path.display(), e))
        })?;
        experiment.neuron.validate()?;
        experiment.run.validate()?;
        Ok(experiment)
    }
}
