//! Plume records and plume-list loading
//!
//! A plume list is a delimited file whose rows describe methane plume
//! candidates. Rows are kept as insertion-ordered field maps so columns
//! added during processing appear after the original ones, in the order
//! they were computed.

mod threshold;

pub use threshold::{min_ppmm_from_fname, ThresholdError};

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use regex_lite::Regex;

use crate::delimited::{read_table, DelimitedConfig, DelimitedError};

/// Column added to every plume with the threshold parsed from its
/// source file name.
pub const MINPPMM_COLUMN: &str = "Minimum Threshold (ppmm)";

/// Column the cumulative output list is sorted by.
pub const CANDIDATE_ID_COLUMN: &str = "Candidate ID";

/// Integrated methane enhancement, input to emission estimation.
pub const IME_COLUMN: &str = "IME (kg)";

/// Plume fetch length, input to emission estimation.
pub const FETCH_COLUMN: &str = "Fetch (m)";

/// A single plume: column name to value, preserving column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlumeRecord {
    fields: Vec<(String, String)>,
}

impl PlumeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Set a column, replacing in place or appending at the end.
    pub fn set(&mut self, column: &str, value: String) {
        match self.fields.iter_mut().find(|(name, _)| name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column.to_string(), value)),
        }
    }

    /// Column names in order.
    pub fn columns(&self) -> Vec<String> {
        self.fields.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Value of the first column, the original sort key for processing.
    pub fn first_value(&self) -> Option<&str> {
        self.fields.first().map(|(_, value)| value.as_str())
    }

    /// Values in the order given by `header`. `None` if any header
    /// column is missing from this record.
    pub fn values_for(&self, header: &[String]) -> Option<Vec<String>> {
        header
            .iter()
            .map(|column| self.get(column).map(str::to_string))
            .collect()
    }

    /// Whether this record's column set matches `header` exactly.
    pub fn matches_header(&self, header: &[String]) -> bool {
        self.fields.len() == header.len()
            && self.fields.iter().zip(header).all(|((name, _), h)| name == h)
    }

    /// Parse a numeric column, treating empty and fill values as absent.
    pub fn numeric(&self, column: &str, fill: f64) -> Option<f64> {
        let raw = self.get(column)?.trim();
        if raw.is_empty() {
            return None;
        }
        let value: f64 = raw.parse().ok()?;
        if value == fill {
            return None;
        }
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, String)> for PlumeRecord {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut record = PlumeRecord::new();
        for (name, value) in iter {
            record.set(&name, value);
        }
        record
    }
}

/// Errors loading a plume list.
#[derive(Debug, thiserror::Error)]
pub enum PlumeError {
    #[error(transparent)]
    Delimited(#[from] DelimitedError),

    #[error(transparent)]
    Threshold(#[from] ThresholdError),

    #[error("plume file has no rows: {}", .0.display())]
    NoPlumes(PathBuf),
}

/// Load all plumes from a file, attaching the minimum-threshold column
/// parsed from the file name.
pub fn load_plumes(path: &Path, config: DelimitedConfig) -> Result<Vec<PlumeRecord>, PlumeError> {
    let min_ppmm = min_ppmm_from_fname(path)?;
    let table = read_table(path, config)?;

    if table.is_empty() {
        return Err(PlumeError::NoPlumes(path.to_path_buf()));
    }

    let plumes = table
        .rows
        .into_iter()
        .map(|row| {
            let mut record: PlumeRecord =
                table.header.iter().cloned().zip(row).collect();
            record.set(MINPPMM_COLUMN, min_ppmm.to_string());
            record
        })
        .collect();

    Ok(plumes)
}

/// Sort plumes by the value of their first column.
pub fn sort_by_first_column(plumes: &mut [PlumeRecord]) {
    plumes.sort_by(|a, b| {
        a.first_value()
            .unwrap_or_default()
            .cmp(b.first_value().unwrap_or_default())
    });
}

/// Extract the observation time embedded in a candidate identifier,
/// e.g. `ang20200924t211743-1` -> 2020-09-24 21:17:43 UTC.
pub fn observation_time(record: &PlumeRecord) -> Option<DateTime<Utc>> {
    let candidate = record
        .get(CANDIDATE_ID_COLUMN)
        .or_else(|| record.first_value())?;

    let re = Regex::new(r"(\d{8})t(\d{6})").expect("static pattern");
    let caps = re.captures(candidate)?;
    let stamp = format!("{}{}", &caps[1], &caps[2]);
    let naive = NaiveDateTime::parse_from_str(&stamp, "%Y%m%d%H%M%S").ok()?;
    Some(naive.and_utc())
}
