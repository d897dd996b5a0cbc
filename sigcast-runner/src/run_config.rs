//! Serializable run configuration with a content-addressed id.

use serde::{Deserialize, Serialize};
use sigcast_core::BacktestConfig;
use std::path::Path;
use thiserror::Error;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

/// Errors loading a run configuration file.
#[derive(Debug, Error)]
pub enum RunConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One named, reproducible run: everything the engine needs plus a label.
///
/// Two runs with identical configs hash to the same [`RunId`], so results
/// can be compared and deduplicated across sweeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Human-readable label, carried into reports.
    pub name: String,

    /// Engine parameterization.
    #[serde(flatten)]
    pub engine: BacktestConfig,
}

impl RunConfig {
    pub fn new(name: impl Into<String>, engine: BacktestConfig) -> Self {
        Self {
            name: name.into(),
            engine,
        }
    }

    /// Deterministic hash id over the serialized configuration.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }

    pub fn from_toml_str(text: &str) -> Result<Self, RunConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_toml_path(path: &Path) -> Result<Self, RunConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            engine: BacktestConfig::default(),
        }
    }
}
