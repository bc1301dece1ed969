//! Configuration management for analysis runs
//!
//! This module provides runtime configuration loading from JSON files so
//! framing and numerical guard thresholds can be adjusted without
//! recompilation. The analysis engine itself never reads files; values
//! enter through the plugin registry and the offline host.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::KurtosisThresholds;
use crate::error::ConfigError;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub kurtosis: KurtosisConfig,
}

/// Framing parameters used by the offline host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Analysis window length in samples
    pub block_size: usize,
    /// Hop between successive frames in samples
    pub step_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            block_size: 1024,
            step_size: 512,
        }
    }
}

/// Guard thresholds for degenerate frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KurtosisConfig {
    /// Total magnitude at or below which a frame is treated as silent
    pub silence_threshold: f64,
    /// Spread, as a fraction of the bin width, at or below which the
    /// distribution is treated as a single point
    pub spread_epsilon: f64,
}

impl Default for KurtosisConfig {
    fn default() -> Self {
        let thresholds = KurtosisThresholds::default();
        Self {
            silence_threshold: thresholds.silence_threshold,
            spread_epsilon: thresholds.spread_epsilon,
        }
    }
}

impl KurtosisConfig {
    pub fn thresholds(&self) -> KurtosisThresholds {
        KurtosisThresholds {
            silence_threshold: self.silence_threshold,
            spread_epsilon: self.spread_epsilon,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults if the file doesn't exist
    /// or the JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match Self::try_load_from_file(&path) {
            Ok(config) => {
                log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                config
            }
            Err(err) => {
                log::warn!("[Config] {}. Using defaults.", err);
                Self::default()
            }
        }
    }

    /// Load configuration from JSON file, reporting any failure
    pub fn try_load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let display = path.as_ref().display().to_string();
        let contents = fs::read_to_string(&path).map_err(|err| ConfigError::Read {
            path: display.clone(),
            reason: err.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|err| ConfigError::Parse {
            path: display,
            reason: err.to_string(),
        })
    }
}
