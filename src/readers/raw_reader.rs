//! Reads raw daily CSV files and reconciles them to the current schema.
//!
//! Older files may carry columns that were since dropped (`snow`) or lack
//! columns added later. Unknown columns are discarded, missing ones are
//! filled with the null marker, and every record comes back in schema order.

use crate::utils::constants::{DEPRECATED_COLUMNS, NULL_MARKER, OBSERVATION_COLUMNS};
use csv::{ReaderBuilder, StringRecord};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A raw file's rows, reordered to `OBSERVATION_COLUMNS`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFile {
    pub path: PathBuf,
    pub records: Vec<StringRecord>,
    /// Columns present in the file but not in the schema
    pub dropped_columns: Vec<String>,
    /// Schema columns the file lacked, filled with nulls
    pub missing_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawFileOutcome {
    Loaded(RawFile),
    Skipped { path: PathBuf, reason: String },
}

impl RawFileOutcome {
    fn skipped(path: &Path, reason: impl Into<String>) -> Self {
        RawFileOutcome::Skipped {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

pub fn read_raw_file(path: &Path) -> RawFileOutcome {
    let mut reader = match ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
    {
        Ok(reader) => reader,
        Err(e) => return RawFileOutcome::skipped(path, format!("cannot open: {}", e)),
    };

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => return RawFileOutcome::skipped(path, format!("unreadable header: {}", e)),
    };
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return RawFileOutcome::skipped(path, "no header row");
    }

    let header_names: Vec<&str> = headers.iter().map(str::trim).collect();

    // For each schema column, where it sits in this file (if anywhere)
    let positions: Vec<Option<usize>> = OBSERVATION_COLUMNS
        .iter()
        .map(|column| header_names.iter().position(|h| h == column))
        .collect();
    if positions.iter().all(Option::is_none) {
        return RawFileOutcome::skipped(path, "no recognised columns");
    }

    let dropped_columns: Vec<String> = header_names
        .iter()
        .filter(|h| !OBSERVATION_COLUMNS.contains(h))
        .map(|h| h.to_string())
        .collect();
    let missing_columns: Vec<String> = OBSERVATION_COLUMNS
        .iter()
        .zip(&positions)
        .filter(|(_, position)| position.is_none())
        .map(|(column, _)| column.to_string())
        .collect();

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                return RawFileOutcome::skipped(path, format!("row {}: {}", index + 1, e));
            }
        };
        // Short rows read as trailing nulls; long ones cannot be attributed
        if record.len() > headers.len() {
            return RawFileOutcome::skipped(
                path,
                format!(
                    "row {}: {} fields, header has {}",
                    index + 1,
                    record.len(),
                    headers.len()
                ),
            );
        }
        records.push(
            positions
                .iter()
                .map(|position| position.and_then(|i| record.get(i)).unwrap_or(NULL_MARKER))
                .collect::<StringRecord>(),
        );
    }

    let deprecated = dropped_columns
        .iter()
        .filter(|c| DEPRECATED_COLUMNS.contains(&c.as_str()))
        .count();
    debug!(
        "Read {} rows from {} ({} deprecated, {} unknown, {} missing columns)",
        records.len(),
        path.display(),
        deprecated,
        dropped_columns.len() - deprecated,
        missing_columns.len()
    );

    RawFileOutcome::Loaded(RawFile {
        path: path.to_path_buf(),
        records,
        dropped_columns,
        missing_columns,
    })
}
