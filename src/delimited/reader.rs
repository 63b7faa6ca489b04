//! Quote-aware delimited parsing.

use std::fs;
use std::path::Path;

use super::{DelimitedConfig, DelimitedError, Table};

/// Read a whole delimited file into a [`Table`].
pub fn read_table(path: &Path, config: DelimitedConfig) -> Result<Table, DelimitedError> {
    let contents = fs::read_to_string(path).map_err(|source| DelimitedError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut lines = contents.lines().enumerate();

    let header = loop {
        match lines.next() {
            Some((_, line)) if line.trim().is_empty() => continue,
            Some((n, line)) => {
                break parse_line(line, config).map_err(|message| DelimitedError::Parse {
                    path: path.to_path_buf(),
                    line: n + 1,
                    message,
                })?
            }
            None => {
                return Err(DelimitedError::EmptyFile {
                    path: path.to_path_buf(),
                })
            }
        }
    };

    let mut rows = Vec::new();
    for (n, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = parse_line(line, config).map_err(|message| DelimitedError::Parse {
            path: path.to_path_buf(),
            line: n + 1,
            message,
        })?;

        if fields.len() > header.len() {
            return Err(DelimitedError::Parse {
                path: path.to_path_buf(),
                line: n + 1,
                message: format!(
                    "row has {} fields but header has {}",
                    fields.len(),
                    header.len()
                ),
            });
        }
        fields.resize(header.len(), String::new());
        rows.push(fields);
    }

    Ok(Table { header, rows })
}

/// Parse a single delimited line into fields.
pub fn parse_line(line: &str, config: DelimitedConfig) -> Result<Vec<String>, String> {
    let delimiter = config.delimiter as char;
    let quote = config.quote as char;

    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut at_field_start = true;
    let mut in_quotes = false;
    let mut was_quoted = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == quote {
                if chars.peek() == Some(&quote) {
                    // Doubled quote inside a quoted field.
                    field.push(quote);
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        if c == delimiter {
            fields.push(std::mem::take(&mut field));
            at_field_start = true;
            was_quoted = false;
            continue;
        }

        if at_field_start && config.trim_leading && c.is_whitespace() {
            continue;
        }

        if c == quote && at_field_start {
            in_quotes = true;
            was_quoted = true;
            at_field_start = false;
            continue;
        }

        if was_quoted {
            return Err(format!("unexpected character '{}' after closing quote", c));
        }

        field.push(c);
        at_field_start = false;
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }

    fields.push(field);
    Ok(fields)
}
