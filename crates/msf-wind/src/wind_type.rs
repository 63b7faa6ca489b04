//! Wind-product typing
//!
//! Wind subdirectories encode a wind source and the altitudes it was
//! sampled at: `<source>[_<alt>m...]`, e.g. `hrrr_10m_80m`. Directories
//! that do not parse are classified as unknown and skipped by the
//! pipeline rather than rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Altitude assumed when a source directory carries no altitude tokens.
pub const SURFACE_ALTITUDE_M: u32 = 10;

/// Known wind product sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindSource {
    Hrrr,
    Rtma,
    Era5,
}

impl WindSource {
    /// Label used in output column names (e.g. `HRRR 10m Wind Speed Avg`).
    pub fn label(&self) -> &'static str {
        match self {
            WindSource::Hrrr => "HRRR",
            WindSource::Rtma => "RTMA",
            WindSource::Era5 => "ERA5",
        }
    }
}

/// Error for unrecognized wind source tokens.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown wind source: '{0}'")]
pub struct ParseWindSourceError(pub String);

impl FromStr for WindSource {
    type Err = ParseWindSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hrrr" => Ok(WindSource::Hrrr),
            "rtma" => Ok(WindSource::Rtma),
            "era5" => Ok(WindSource::Era5),
            other => Err(ParseWindSourceError(other.to_string())),
        }
    }
}

impl fmt::Display for WindSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A wind type parsed from a subdirectory name.
///
/// Unknown directories still produce a `WindType` so callers can log
/// what was skipped; `is_unknown` gates all further use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindType {
    raw: String,
    source: Option<WindSource>,
    alts: Vec<u32>,
}

impl WindType {
    /// Parse a wind subdirectory name.
    ///
    /// The first `_`-separated token must be a known source; every
    /// remaining token must be an altitude of the form `<meters>m`.
    /// Any violation yields an unknown wind type.
    pub fn parse(dir_name: &str) -> Self {
        let mut tokens = dir_name.split('_');

        let source = match tokens.next().map(str::parse::<WindSource>) {
            Some(Ok(source)) => source,
            _ => return Self::unknown(dir_name),
        };

        let mut alts = Vec::new();
        for token in tokens {
            match parse_altitude(token) {
                Some(alt) => alts.push(alt),
                None => return Self::unknown(dir_name),
            }
        }

        if alts.is_empty() {
            alts.push(SURFACE_ALTITUDE_M);
        }
        alts.sort_unstable();
        alts.dedup();

        Self {
            raw: dir_name.to_string(),
            source: Some(source),
            alts,
        }
    }

    fn unknown(dir_name: &str) -> Self {
        Self {
            raw: dir_name.to_string(),
            source: None,
            alts: Vec::new(),
        }
    }

    /// The directory name this type was parsed from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_unknown(&self) -> bool {
        self.source.is_none()
    }

    /// Source label for column names. Panics on unknown types; callers
    /// must check `is_unknown` first, as the pipeline does.
    pub fn type_as_str(&self) -> &'static str {
        self.source
            .map(|s| s.label())
            .unwrap_or_else(|| panic!("type_as_str on unknown wind type '{}'", self.raw))
    }

    pub fn source(&self) -> Option<WindSource> {
        self.source
    }

    /// Altitudes in meters, sorted ascending.
    pub fn alts(&self) -> &[u32] {
        &self.alts
    }

    /// Lowest altitude, used for emission-rate estimation.
    pub fn lowest_alt(&self) -> Option<u32> {
        self.alts.first().copied()
    }

    pub fn speed_avg_column(&self, alt: u32) -> String {
        format!("{} {}m Wind Speed Avg (m/s)", self.type_as_str(), alt)
    }

    pub fn speed_std_column(&self, alt: u32) -> String {
        format!("{} {}m Wind Speed Std (m/s)", self.type_as_str(), alt)
    }

    pub fn sample_count_column(&self, alt: u32) -> String {
        format!("{} {}m Wind Sample Count", self.type_as_str(), alt)
    }

    pub fn emission_rate_column(&self) -> String {
        format!("{} Emission Rate (kg/hr)", self.type_as_str())
    }

    pub fn emission_uncertainty_column(&self) -> String {
        format!("{} Emission Uncertainty (kg/hr)", self.type_as_str())
    }
}

fn parse_altitude(token: &str) -> Option<u32> {
    let meters = token.strip_suffix('m')?;
    if meters.is_empty() {
        return None;
    }
    meters.parse().ok()
}
