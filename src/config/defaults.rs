//! Built-in flow defaults.

use super::FlowConfig;
use crate::plume::CANDIDATE_ID_COLUMN;

/// Default detection threshold in ppm-m.
pub const DEFAULT_MIN_PPMM: u32 = 1000;

/// Default fill value for statistics that could not be computed.
pub const DEFAULT_FILL_VALUE: f64 = -9999.0;

/// Build the default plume-path pattern for a threshold.
pub fn default_plume_regex(min_ppmm: u32) -> String {
    format!(
        "ang.*_detections/ime_minppmm{t}/ang.*_ime_minppmm{t}.*",
        t = min_ppmm
    )
}

/// The built-in configuration layer.
#[derive(Debug, Clone)]
pub struct FlowDefaults {
    pub fill_value: f64,
    pub sort_key: String,
    pub min_ppmm: u32,
    pub window_seconds: u64,
    pub poll_interval_seconds: u64,
    pub ignore: Vec<String>,
}

impl Default for FlowDefaults {
    fn default() -> Self {
        Self {
            fill_value: DEFAULT_FILL_VALUE,
            sort_key: CANDIDATE_ID_COLUMN.to_string(),
            min_ppmm: DEFAULT_MIN_PPMM,
            window_seconds: 3600,
            poll_interval_seconds: 60,
            ignore: vec!["**/.DS_Store".to_string(), "**/*.bak".to_string()],
        }
    }
}

impl FlowDefaults {
    /// Materialize the defaults as a complete [`FlowConfig`]. The
    /// plume pattern is derived from the threshold so the two stay
    /// consistent unless the pattern is overridden explicitly.
    pub fn to_config(&self) -> FlowConfig {
        FlowConfig {
            fill_value: self.fill_value,
            sort_key: self.sort_key.clone(),
            min_ppmm: self.min_ppmm,
            window_seconds: self.window_seconds,
            poll_interval_seconds: self.poll_interval_seconds,
            plume_regex: default_plume_regex(self.min_ppmm),
            ignore: self.ignore.clone(),
        }
    }
}
