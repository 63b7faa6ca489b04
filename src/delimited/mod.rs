//! Delimited table reading and writing
//!
//! Plume lists and wind sample files are comma-delimited text with a
//! header row. The reader is quote-aware and trims leading whitespace
//! after delimiters; quoted fields may contain the delimiter and
//! doubled quotes, but not embedded newlines.

mod reader;
mod writer;

pub use reader::{parse_line, read_table};
pub use writer::{write_field, write_table};

use std::path::PathBuf;

/// Configuration for delimited parsing.
#[derive(Debug, Clone, Copy)]
pub struct DelimitedConfig {
    pub delimiter: u8,
    pub quote: u8,
    /// Trim whitespace immediately following a delimiter, matching the
    /// upstream plume files which pad columns for readability.
    pub trim_leading: bool,
}

impl Default for DelimitedConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim_leading: true,
        }
    }
}

/// An in-memory delimited table: header plus rows of fields.
///
/// Rows shorter than the header are padded with empty fields on read;
/// rows longer than the header are a parse error.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Errors for delimited IO.
#[derive(Debug, thiserror::Error)]
pub enum DelimitedError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{}: file has no header row", path.display())]
    EmptyFile { path: PathBuf },
}
