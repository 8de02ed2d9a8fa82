//! Configuration loading and typed config structures for the Fable engine.
//!
//! The canonical configuration lives in `fable-config.yaml` at the project
//! root. Every section and field is optional; anything left out takes the
//! default documented on its field.

use std::path::Path;

use fable_agents::AgentDefaults;
use fable_world::{CellEnergyRange, DistributionStrategy, SeasonCaps};
use serde::Deserialize;

use crate::environment::{EnvironmentParams, WorldSettings};

/// Environment variable that overrides `world.seed`.
pub const SEED_ENV_VAR: &str = "FABLE_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an unusable world.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Seed and default environment dimensions.
    #[serde(default)]
    pub world: WorldConfig,

    /// Per-season production caps.
    #[serde(default)]
    pub seasons: SeasonCaps,

    /// Intrinsic energy range for new cells.
    #[serde(default)]
    pub cells: CellsConfig,

    /// Redistribution policy run on every day tick.
    #[serde(default)]
    pub distribution: DistributionStrategy,

    /// Starting profiles for each agent kind.
    #[serde(default)]
    pub agents: AgentDefaults,

    /// Scripted demo run (used by the engine binary only).
    #[serde(default)]
    pub demo: DemoConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `FABLE_SEED`, when set to an integer, overrides `world.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, applying environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are unusable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup(SEED_ENV_VAR) {
            match val.trim().parse::<u64>() {
                Ok(seed) => self.world.seed = seed,
                Err(_) => tracing::warn!(value = %val, "Ignoring non-numeric {SEED_ENV_VAR}"),
            }
        }
    }

    /// Check that the configuration describes a usable world.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for zero dimensions, a zero cycle,
    /// a zero season cap, or a bad cell energy range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.height == 0 || self.world.width == 0 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "grid dimensions {}x{} must be positive",
                    self.world.height, self.world.width
                ),
            });
        }
        if self.world.cycle == 0 {
            return Err(ConfigError::Invalid {
                reason: "world.cycle must be at least 1".to_owned(),
            });
        }
        self.seasons
            .validate()
            .and_then(|()| self.cells.range().validate())
            .map_err(|e| ConfigError::Invalid {
                reason: e.to_string(),
            })
    }

    /// The world settings every new environment is built with.
    pub const fn world_settings(&self) -> WorldSettings {
        WorldSettings {
            caps: self.seasons,
            cell_energy: self.cells.range(),
            distribution: self.distribution,
        }
    }

    /// Dimensions for environments created without explicit parameters.
    pub const fn default_params(&self) -> EnvironmentParams {
        EnvironmentParams {
            height: self.world.height,
            width: self.world.width,
            cycle: self.world.cycle,
            seed: None,
        }
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Master seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Default grid height.
    #[serde(default = "default_dimension")]
    pub height: u32,

    /// Default grid width.
    #[serde(default = "default_dimension")]
    pub width: u32,

    /// Default days per season.
    #[serde(default = "default_cycle")]
    pub cycle: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            height: default_dimension(),
            width: default_dimension(),
            cycle: default_cycle(),
        }
    }
}

/// Cell creation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CellsConfig {
    /// Smallest intrinsic energy a cell may get.
    #[serde(default = "default_min_energy")]
    pub min_energy: u32,

    /// Largest intrinsic energy a cell may get.
    #[serde(default = "default_max_energy")]
    pub max_energy: u32,
}

impl CellsConfig {
    /// The energy range these settings describe.
    pub const fn range(&self) -> CellEnergyRange {
        CellEnergyRange {
            min: self.min_energy,
            max: self.max_energy,
        }
    }
}

impl Default for CellsConfig {
    fn default() -> Self {
        Self {
            min_energy: default_min_energy(),
            max_energy: default_max_energy(),
        }
    }
}

/// Scripted demo run parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DemoConfig {
    /// Foragers registered at start.
    #[serde(default = "default_demo_foragers")]
    pub foragers: u32,

    /// Vocalists registered at start.
    #[serde(default = "default_demo_vocalists")]
    pub vocalists: u32,

    /// Day ticks to run before shutting down.
    #[serde(default = "default_demo_days")]
    pub days: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            foragers: default_demo_foragers(),
            vocalists: default_demo_vocalists(),
            days: default_demo_days(),
        }
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_dimension() -> u32 {
    5
}

const fn default_cycle() -> u32 {
    10
}

const fn default_min_energy() -> u32 {
    1
}

const fn default_max_energy() -> u32 {
    10
}

const fn default_demo_foragers() -> u32 {
    2
}

const fn default_demo_vocalists() -> u32 {
    2
}

const fn default_demo_days() -> u64 {
    40
}
