//! Delimited table writing.

use std::fs;
use std::io::Write;
use std::path::Path;

use super::{DelimitedConfig, DelimitedError};

/// Write a header and rows to `path`, quoting fields that need it.
pub fn write_table(
    path: &Path,
    header: &[String],
    rows: &[Vec<String>],
    config: DelimitedConfig,
) -> Result<(), DelimitedError> {
    let mut out = Vec::new();
    write_row(&mut out, header, config).map_err(|source| DelimitedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    for row in rows {
        write_row(&mut out, row, config).map_err(|source| DelimitedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, out).map_err(|source| DelimitedError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_row<W: Write>(
    out: &mut W,
    fields: &[String],
    config: DelimitedConfig,
) -> std::io::Result<()> {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.write_all(&[config.delimiter])?;
        }
        out.write_all(write_field(field, config).as_bytes())?;
    }
    out.write_all(b"\n")
}

/// Quote a field if it contains the delimiter, the quote, or a newline.
pub fn write_field(field: &str, config: DelimitedConfig) -> String {
    let delimiter = config.delimiter as char;
    let quote = config.quote as char;

    let needs_quoting = field.contains(delimiter)
        || field.contains(quote)
        || field.contains('\n')
        || field.contains('\r');

    if !needs_quoting {
        return field.to_string();
    }

    let doubled = field.replace(quote, &format!("{quote}{quote}"));
    format!("{quote}{doubled}{quote}")
}
