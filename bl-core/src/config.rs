//! Search configuration file (YAML).
//!
//! Everything has a default, so an empty document is a valid config and the
//! CLI can run without one; flags override file values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::state::DEFAULT_MU;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Search driver settings.
    #[serde(default)]
    pub search: SearchParams,
    /// Training-data collection settings.
    #[serde(default)]
    pub collect: CollectParams,
}

/// Search driver parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchParams {
    /// Maximum search depth (edges from the root).
    #[serde(default = "default_depth")]
    pub depth: u32,
    /// Simulations per search.
    #[serde(default = "default_simulations")]
    pub simulations: u32,
    /// Depth penalty in the reward function.
    #[serde(default = "default_mu")]
    pub mu: f32,
    /// Worker threads for root parallelization; 0 auto-detects.
    #[serde(default)]
    pub num_threads: usize,
    /// Verbose per-iteration output on the driver.
    #[serde(default)]
    pub debug: bool,
}

fn default_depth() -> u32 {
    5
}

fn default_simulations() -> u32 {
    300
}

fn default_mu() -> f32 {
    DEFAULT_MU
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            simulations: default_simulations(),
            mu: default_mu(),
            num_threads: 0,
            debug: false,
        }
    }
}

/// Training-data collection parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectParams {
    /// Maximum samples per extraction.
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
    /// Minimum visit count for a node to contribute a sample.
    #[serde(default = "default_min_visits")]
    pub min_visits: u32,
}

fn default_max_samples() -> usize {
    1000
}

fn default_min_visits() -> u32 {
    2
}

impl Default for CollectParams {
    fn default() -> Self {
        Self {
            max_samples: default_max_samples(),
            min_visits: default_min_visits(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
