//! CSV persistence for the canonical collection.
//!
//! The collection lives in a single CSV file with a fixed column set
//! ([`COLUMNS`](crate::record::COLUMNS)). Loading is tolerant of extra
//! columns (ignored) and short rows (padded with blanks), but a file whose
//! header lacks the required columns is rejected before any row is read.
//! Saving is deterministic: columns in declared order, rows sorted by
//! author then title (case-insensitive), multi-valued cells pipe-joined in
//! sorted order.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::{BinderyError, Result};
use crate::record::{Record, COLUMNS};

/// Columns that must be present in a collection header.
///
/// Everything else may be absent (treated as blank for every row), which
/// keeps hand-maintained spreadsheets loadable before their first save.
const REQUIRED_COLUMNS: &[&str] = &["title", "author"];

/// Load a collection CSV into records, preserving file order.
///
/// Blank cells become `None`, pipe-delimited cells become sets. Unknown
/// columns are ignored so the format can grow without breaking older files.
pub fn load_collection(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|e| BinderyError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();

    // Map known header positions once; row parsing then indexes directly.
    let mut slots: Vec<(usize, &'static str)> = Vec::new();
    for (idx, name) in headers.iter().enumerate() {
        let name = name.trim();
        if let Some(column) = COLUMNS.iter().find(|c| **c == name).copied() {
            slots.push((idx, column));
        }
    }

    for required in REQUIRED_COLUMNS {
        if !slots.iter().any(|(_, column)| column == required) {
            return Err(BinderyError::MissingColumn {
                path: path.to_path_buf(),
                column: required.to_string(),
            });
        }
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut record = Record::default();
        for &(idx, column) in &slots {
            let cell = row.get(idx).unwrap_or("");
            record.set_csv_cell(column, cell);
        }
        records.push(record);
    }

    Ok(records)
}

/// Save records as a collection CSV.
///
/// Rows are sorted by (author, title), both lowercased, so repeated saves of
/// the same collection are byte-identical regardless of in-memory order. An
/// empty slice writes the header row only.
pub fn save_collection(path: impl AsRef<Path>, records: &[Record]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;

    let file = File::create(path).map_err(|e| BinderyError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut sorted: Vec<&Record> = records.iter().collect();
    sorted.sort_by_key(|record| {
        (
            record.display_author().to_lowercase(),
            record.display_title().to_lowercase(),
        )
    });

    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    writer.write_record(COLUMNS)?;
    for record in sorted {
        let cells: Vec<String> = COLUMNS.iter().map(|column| record.csv_cell(column)).collect();
        writer.write_record(&cells)?;
    }
    writer.flush().map_err(|e| BinderyError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Save any serializable report as pretty-printed JSON.
pub fn save_report<T: Serialize>(path: impl AsRef<Path>, report: &T) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;

    let file = File::create(path).map_err(|e| BinderyError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush().map_err(|e| BinderyError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| BinderyError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    Ok(())
}
