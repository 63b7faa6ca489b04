//! Wind sample file loading
//!
//! Sample files are delimited tables with a `Timestamp (UTC)` column
//! (either `YYYYMMDDtHHMMSS` or RFC 3339) and a `Wind Speed (m/s)`
//! column. Direction and altitude columns are optional. Rows that do
//! not parse are counted and skipped, never fatal; upstream wind
//! archives routinely contain sentinel rows.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use msf_wind::WindSample;

use crate::delimited::{read_table, DelimitedConfig, DelimitedError};

pub const TIMESTAMP_COLUMN: &str = "Timestamp (UTC)";
pub const SPEED_COLUMN: &str = "Wind Speed (m/s)";
pub const DIRECTION_COLUMN: &str = "Wind Direction (deg)";
pub const ALTITUDE_COLUMN: &str = "Altitude (m)";

/// Samples loaded from one wind product directory.
#[derive(Debug, Default)]
pub struct LoadedSamples {
    pub samples: Vec<WindSample>,
    pub skipped_rows: usize,
    pub files_read: usize,
}

/// Errors loading wind sample files.
#[derive(Debug, thiserror::Error)]
pub enum WindFileError {
    #[error("failed to read wind directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Delimited(#[from] DelimitedError),

    #[error("{}: missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Load every sample file directly inside `dir`, in sorted order.
pub fn load_samples(dir: &Path, config: DelimitedConfig) -> Result<LoadedSamples, WindFileError> {
    let read_dir = fs::read_dir(dir).map_err(|source| WindFileError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|source| WindFileError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        if entry.path().is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let mut loaded = LoadedSamples::default();
    for path in paths {
        read_sample_file(&path, config, &mut loaded)?;
        loaded.files_read += 1;
    }
    Ok(loaded)
}

fn read_sample_file(
    path: &Path,
    config: DelimitedConfig,
    loaded: &mut LoadedSamples,
) -> Result<(), WindFileError> {
    let table = read_table(path, config)?;

    let column = |name: &'static str| -> Result<usize, WindFileError> {
        table
            .header
            .iter()
            .position(|h| h == name)
            .ok_or(WindFileError::MissingColumn {
                path: path.to_path_buf(),
                column: name,
            })
    };

    let time_idx = column(TIMESTAMP_COLUMN)?;
    let speed_idx = column(SPEED_COLUMN)?;
    let direction_idx = table.header.iter().position(|h| h == DIRECTION_COLUMN);
    let altitude_idx = table.header.iter().position(|h| h == ALTITUDE_COLUMN);

    for row in &table.rows {
        let time = parse_timestamp(row[time_idx].trim());
        let speed: Option<f64> = row[speed_idx].trim().parse().ok();

        let (Some(time), Some(speed_mps)) = (time, speed) else {
            loaded.skipped_rows += 1;
            continue;
        };
        if !speed_mps.is_finite() || speed_mps < 0.0 {
            loaded.skipped_rows += 1;
            continue;
        }

        loaded.samples.push(WindSample {
            time,
            speed_mps,
            direction_deg: direction_idx.and_then(|i| row[i].trim().parse().ok()),
            altitude_m: altitude_idx.and_then(|i| row[i].trim().parse().ok()),
        });
    }
    Ok(())
}

/// Parse `YYYYMMDDtHHMMSS` (upstream compact form) or RFC 3339.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y%m%dt%H%M%S") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
