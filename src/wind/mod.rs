//! Wind directory discovery
//!
//! A winds directory contains one subdirectory per wind product
//! (`hrrr_10m`, `rtma`, ...), each holding delimited sample files.
//! Hidden entries are ignored and subdirectories are visited in sorted
//! order so output columns are deterministic.

mod samples;

pub use samples::{load_samples, LoadedSamples, WindFileError};

use std::fs;
use std::path::{Path, PathBuf};

use msf_wind::WindType;

/// A wind subdirectory and its parsed type. Unknown types are returned
/// so the caller can log what it skipped.
#[derive(Debug, Clone)]
pub struct WindDirEntry {
    pub wind_type: WindType,
    pub path: PathBuf,
}

/// Errors scanning the winds directory.
#[derive(Debug, thiserror::Error)]
pub enum WindDirError {
    #[error("failed to read winds directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("winds directory contains no wind product subdirectories: {}", .0.display())]
    Empty(PathBuf),
}

/// List wind product subdirectories in sorted order.
pub fn scan_wind_dirs(winds_dir: &Path) -> Result<Vec<WindDirEntry>, WindDirError> {
    let read_dir = fs::read_dir(winds_dir).map_err(|source| WindDirError::Io {
        path: winds_dir.to_path_buf(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|source| WindDirError::Io {
            path: winds_dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        if entry.path().is_dir() {
            names.push(name);
        }
    }
    names.sort();

    if names.is_empty() {
        return Err(WindDirError::Empty(winds_dir.to_path_buf()));
    }

    Ok(names
        .into_iter()
        .map(|name| WindDirEntry {
            wind_type: WindType::parse(&name),
            path: winds_dir.join(name),
        })
        .collect())
}
