//! Configuration layering
//!
//! Three layers merge into the effective configuration:
//! 1. Built-in flow defaults
//! 2. Config file (`msf-flow.toml`)
//! 3. CLI flags
//!
//! The effective config records where each layer came from, including a
//! SHA-256 digest of the file layer, so a run summary can state exactly
//! which configuration produced it.

mod defaults;
mod effective;

pub use defaults::{default_plume_regex, FlowDefaults};
pub use effective::{ConfigOrigin, ConfigSource, EffectiveConfig};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Fully resolved flow configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowConfig {
    /// Value written for statistics that could not be computed.
    pub fill_value: f64,

    /// Column the cumulative output list is sorted by.
    pub sort_key: String,

    /// Detection threshold used to build the default plume pattern.
    pub min_ppmm: u32,

    /// Width of the wind-sample window centered on the observation.
    pub window_seconds: u64,

    /// Watcher poll interval.
    pub poll_interval_seconds: u64,

    /// Regular expression matched against plume paths relative to the
    /// watched directory.
    pub plume_regex: String,

    /// Glob patterns the watcher never considers.
    pub ignore: Vec<String>,
}

/// Optional overrides from the config file layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub fill_value: Option<f64>,
    pub sort_key: Option<String>,
    pub min_ppmm: Option<u32>,
    pub window_seconds: Option<u64>,
    pub poll_interval_seconds: Option<u64>,
    pub plume_regex: Option<String>,
    pub ignore: Option<Vec<String>>,
}

/// Optional overrides from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub fill_value: Option<f64>,
    pub sort_key: Option<String>,
    pub min_ppmm: Option<u32>,
    pub window_seconds: Option<u64>,
    pub poll_interval_seconds: Option<u64>,
    pub plume_regex: Option<String>,
}

impl CliOverrides {
    pub fn is_empty(&self) -> bool {
        self.fill_value.is_none()
            && self.sort_key.is_none()
            && self.min_ppmm.is_none()
            && self.window_seconds.is_none()
            && self.poll_interval_seconds.is_none()
            && self.plume_regex.is_none()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config validation: {0}")]
    Validation(String),
}

impl FlowConfig {
    /// Validate bounds on the merged configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_seconds == 0 || self.window_seconds > 86400 {
            return Err(ConfigError::Validation(
                "window_seconds must be in (0, 86400]".to_string(),
            ));
        }
        if self.poll_interval_seconds == 0 || self.poll_interval_seconds > 3600 {
            return Err(ConfigError::Validation(
                "poll_interval_seconds must be in (0, 3600]".to_string(),
            ));
        }
        if self.min_ppmm == 0 {
            return Err(ConfigError::Validation(
                "min_ppmm must be positive".to_string(),
            ));
        }
        if self.sort_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "sort_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = FlowDefaults::default().to_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = FlowDefaults::default().to_config();
        config.window_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_poll_interval() {
        let mut config = FlowDefaults::default().to_config();
        config.poll_interval_seconds = 7200;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_sort_key() {
        let mut config = FlowDefaults::default().to_config();
        config.sort_key = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_overrides_is_empty() {
        assert!(CliOverrides::default().is_empty());
        let cli = CliOverrides {
            min_ppmm: Some(500),
            ..Default::default()
        };
        assert!(!cli.is_empty());
    }
}
