//! Cumulative plume list output
//!
//! New plumes are inserted into the output file rather than appended
//! blindly: an existing file is read back, backed up to `<name>.bak`,
//! merged with the new plumes, sorted by the configured key, and
//! rewritten. Rows whose columns no longer match the header are
//! reported and dropped instead of corrupting the file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::delimited::{read_table, write_table, DelimitedConfig, DelimitedError};
use crate::plume::PlumeRecord;

/// What an insertion did, for summaries and logging.
#[derive(Debug, Default, PartialEq)]
pub struct InsertOutcome {
    /// Rows written to the output file.
    pub written: usize,

    /// Rows dropped because their columns did not match the header.
    pub skipped_rows: usize,

    /// Backup path, when a pre-existing output file was preserved.
    pub backup: Option<PathBuf>,

    /// Whether the merged list was sorted by the sort key.
    pub sorted: bool,

    /// Insertion skipped entirely because the plume list was empty.
    pub skipped_empty: bool,
}

/// Errors writing the output list.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error(transparent)]
    Delimited(#[from] DelimitedError),

    #[error("failed to back up {} to {}: {source}", path.display(), backup.display())]
    Backup {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Insert plumes into the output file at `path`.
pub fn insert_plumes(
    plumes: Vec<PlumeRecord>,
    path: &Path,
    sort_key: &str,
    config: DelimitedConfig,
) -> Result<InsertOutcome, OutputError> {
    if plumes.is_empty() {
        warn!("skipped insertion because plume list was empty");
        return Ok(InsertOutcome {
            skipped_empty: true,
            ..Default::default()
        });
    }

    let mut outcome = InsertOutcome::default();
    let mut merged: Vec<PlumeRecord> = Vec::new();

    if path.is_file() {
        let existing = read_table(path, config)?;
        merged.extend(existing.rows.into_iter().map(|row| {
            existing
                .header
                .iter()
                .cloned()
                .zip(row)
                .collect::<PlumeRecord>()
        }));

        let backup = backup_path(path);
        fs::copy(path, &backup).map_err(|source| OutputError::Backup {
            path: path.to_path_buf(),
            backup: backup.clone(),
            source,
        })?;
        warn!(backup = %backup.display(), "original plume file backed up");
        outcome.backup = Some(backup);
    }

    merged.extend(plumes);

    // Sort by the configured key when the first record carries it.
    if merged[0].get(sort_key).is_some() {
        merged.sort_by(|a, b| {
            a.get(sort_key)
                .unwrap_or_default()
                .cmp(b.get(sort_key).unwrap_or_default())
        });
        outcome.sorted = true;
    } else {
        warn!(sort_key, "sort key not found; plumes left unsorted");
    }

    let header = merged[0].columns();
    let mut rows = Vec::with_capacity(merged.len());
    for record in &merged {
        match record.values_for(&header) {
            Some(values) if record.len() == header.len() => rows.push(values),
            _ => {
                warn!(
                    candidate = record.first_value().unwrap_or("<empty>"),
                    "plume fields do not match output header; row skipped"
                );
                outcome.skipped_rows += 1;
            }
        }
    }

    write_table(path, &header, &rows, config)?;
    outcome.written = rows.len();
    Ok(outcome)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}
