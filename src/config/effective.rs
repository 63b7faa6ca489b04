//! Effective configuration with provenance
//!
//! Captures the merged configuration plus where each value came from,
//! so summaries can state which file (by digest) shaped a run.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::defaults::{default_plume_regex, FlowDefaults};
use super::{CliOverrides, ConfigError, FileConfig, FlowConfig};

/// Schema version for the serialized effective config.
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier.
pub const SCHEMA_ID: &str = "msf-flow/effective_config@1";

/// Origin of a configuration layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing config layer with provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (absent for builtin/cli layers).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of the raw file bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// The merged configuration plus provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub schema_version: u32,
    pub schema_id: String,
    pub created_at: DateTime<Utc>,

    /// Run ID, attached once a run starts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,

    pub config: FlowConfig,
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Merge defaults, an optional config file, and CLI flags.
    pub fn build(config_path: Option<&Path>, cli: CliOverrides) -> Result<Self, ConfigError> {
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        let mut config = FlowDefaults::default().to_config();
        // The plume pattern follows min_ppmm unless a layer pins it.
        let mut regex_overridden = false;

        if let Some(path) = config_path {
            if path.exists() {
                let (file_config, digest) = load_toml_file(path)?;
                apply_file_layer(&mut config, &file_config, &mut regex_overridden);
                sources.push(ConfigSource {
                    origin: ConfigOrigin::File,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                });
            }
        }

        if !cli.is_empty() {
            apply_cli_layer(&mut config, &cli, &mut regex_overridden);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        if !regex_overridden {
            config.plume_regex = default_plume_regex(config.min_ppmm);
        }

        config.validate()?;

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            run_id: None,
            config,
            sources,
        })
    }

    pub fn with_run_id(mut self, run_id: String) -> Self {
        self.run_id = Some(run_id);
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }
}

fn load_toml_file(path: &Path) -> Result<(FileConfig, String), ConfigError> {
    let bytes = fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let contents = String::from_utf8_lossy(&bytes);
    let file_config: FileConfig =
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok((file_config, digest))
}

fn apply_file_layer(config: &mut FlowConfig, layer: &FileConfig, regex_overridden: &mut bool) {
    if let Some(v) = layer.fill_value {
        config.fill_value = v;
    }
    if let Some(ref v) = layer.sort_key {
        config.sort_key = v.clone();
    }
    if let Some(v) = layer.min_ppmm {
        config.min_ppmm = v;
    }
    if let Some(v) = layer.window_seconds {
        config.window_seconds = v;
    }
    if let Some(v) = layer.poll_interval_seconds {
        config.poll_interval_seconds = v;
    }
    if let Some(ref v) = layer.plume_regex {
        config.plume_regex = v.clone();
        *regex_overridden = true;
    }
    if let Some(ref v) = layer.ignore {
        config.ignore = v.clone();
    }
}

fn apply_cli_layer(config: &mut FlowConfig, cli: &CliOverrides, regex_overridden: &mut bool) {
    if let Some(v) = cli.fill_value {
        config.fill_value = v;
    }
    if let Some(ref v) = cli.sort_key {
        config.sort_key = v.clone();
    }
    if let Some(v) = cli.min_ppmm {
        config.min_ppmm = v;
    }
    if let Some(v) = cli.window_seconds {
        config.window_seconds = v;
    }
    if let Some(v) = cli.poll_interval_seconds {
        config.poll_interval_seconds = v;
    }
    if let Some(ref v) = cli.plume_regex {
        config.plume_regex = v.clone();
        *regex_overridden = true;
    }
}
