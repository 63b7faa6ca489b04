//! Minimum-threshold extraction from plume file names
//!
//! Plume files are named like
//! `ang20200924t211743_ime_minppmm1000_plumes.csv`; the `minppmm<N>`
//! token carries the detection threshold in ppm-m and must be present.

use std::path::{Path, PathBuf};

use regex_lite::Regex;

/// Errors extracting the threshold.
#[derive(Debug, thiserror::Error)]
pub enum ThresholdError {
    #[error("no 'minppmm<N>' token found in file name: {}", .0.display())]
    NoMatch(PathBuf),

    #[error("threshold out of range in file name: {}", .0.display())]
    OutOfRange(PathBuf),
}

/// Extract the minimum ppm-m threshold from a plume file name.
pub fn min_ppmm_from_fname(path: &Path) -> Result<u32, ThresholdError> {
    let name = path.to_string_lossy();
    let re = Regex::new(r"minppmm(\d+)").expect("static pattern");

    let caps = re
        .captures(&name)
        .ok_or_else(|| ThresholdError::NoMatch(path.to_path_buf()))?;

    caps[1]
        .parse()
        .map_err(|_| ThresholdError::OutOfRange(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_threshold() {
        let path = Path::new("ang20200924t211743_ime_minppmm1000_plumes.csv");
        assert_eq!(min_ppmm_from_fname(path).unwrap(), 1000);
    }

    #[test]
    fn test_matches_anywhere_in_path() {
        let path = Path::new("detections/ime_minppmm500/ang_ime.csv");
        assert_eq!(min_ppmm_from_fname(path).unwrap(), 500);
    }

    #[test]
    fn test_first_match_wins() {
        let path = Path::new("ime_minppmm250/ang_ime_minppmm1000.csv");
        assert_eq!(min_ppmm_from_fname(path).unwrap(), 250);
    }

    #[test]
    fn test_no_match_is_error() {
        let path = Path::new("plumes.csv");
        assert!(matches!(
            min_ppmm_from_fname(path),
            Err(ThresholdError::NoMatch(_))
        ));
    }

    #[test]
    fn test_oversized_threshold_is_error() {
        let path = Path::new("minppmm99999999999999999999.csv");
        assert!(matches!(
            min_ppmm_from_fname(path),
            Err(ThresholdError::OutOfRange(_))
        ));
    }
}
