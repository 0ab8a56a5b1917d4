//! TOML-based engine configuration.
//!
//! Example configuration:
//! ```toml
//! # Upper bound on candidates kept per card template. 0 disables the cap.
//! max_candidates_per_card = 250
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Engine tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on candidates kept per card template. The cartesian
    /// expansion behind a template can be the product of many
    /// per-dimension match counts; this bounds what one run will ever
    /// hold. `0` disables the cap - callers taking that off are expected
    /// to bound consumption themselves.
    pub max_candidates_per_card: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_candidates_per_card: 100,
        }
    }
}

impl EngineConfig {
    /// The effective candidate cap; `None` means uncapped.
    pub fn candidate_cap(&self) -> Option<usize> {
        match self.max_candidates_per_card {
            0 => None,
            cap => Some(cap),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }
}
