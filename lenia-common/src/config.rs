use crate::error::{ensure_positive, LeniaError};
use crate::params::Params;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

// Initial particle placement, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InitialConditions {
    pub num_particles: u32,
    /// Particles are sampled uniformly in [-half_width, half_width)^2.
    pub half_width: f64,
    pub seed: u64,
}

impl Default for InitialConditions {
    fn default() -> Self {
        InitialConditions {
            num_particles: 200,
            half_width: 6.0,
            seed: 20,
        }
    }
}

// Configuration for timing
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub dt: f64,
    pub n_steps: usize,
    /// Snapshot stride in steps. 0 is treated as 1.
    pub record_interval_steps: usize,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            dt: 0.1,
            n_steps: 10_000,
            record_interval_steps: 10,
        }
    }
}

/// Serialization format for recorded snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Bincode,
    MessagePack,
}

impl OutputFormat {
    /// Parses a format name, case-insensitively. Returns `None` for unknown names.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "bincode" | "bin" => Some(OutputFormat::Bincode),
            "messagepack" | "msgpack" => Some(OutputFormat::MessagePack),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Bincode => "bin",
            OutputFormat::MessagePack => "msgpack",
        }
    }
}

// Configuration for output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub base_filename: String,
    pub format: String, // "json", "bincode", "messagepack"
    pub save_snapshots: bool,
    pub save_final_positions: bool,
    pub positions_in_snapshots: bool,
    /// Side length of the final field grid written as CSV. 0 disables it.
    pub field_grid_resolution: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            base_filename: "rotor".to_string(),
            format: "json".to_string(),
            save_snapshots: true,
            save_final_positions: true,
            positions_in_snapshots: true,
            field_grid_resolution: 0,
        }
    }
}

impl OutputConfig {
    pub fn output_format(&self) -> Option<OutputFormat> {
        OutputFormat::parse(&self.format)
    }
}

/// Main simulation configuration structure, loaded from config.toml.
/// Every section is optional and falls back to the reference rotor run.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LeniaConfig {
    pub params: Params,
    pub initial_conditions: InitialConditions,
    pub timing: TimingConfig,
    pub output: OutputConfig,
}

impl LeniaConfig {
    /// Loads and validates the configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| {
                anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e)
            })?;
        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))?;

        Ok(config)
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: LeniaConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that would fail before the first step.
    pub fn validate(&self) -> Result<(), LeniaError> {
        self.params.validate()?;
        ensure_positive("dt", self.timing.dt)?;
        ensure_positive("half_width", self.initial_conditions.half_width)?;
        if self.initial_conditions.num_particles == 0 {
            return Err(LeniaError::EmptyParticleSet);
        }
        if self.output.field_grid_resolution == 1 {
            return Err(LeniaError::invalid(
                "field_grid_resolution",
                1.0,
                "must be 0 (disabled) or at least 2",
            ));
        }
        Ok(())
    }

    /// Snapshot stride in steps, never zero.
    pub fn record_interval_steps(&self) -> usize {
        self.timing.record_interval_steps.max(1)
    }
}
