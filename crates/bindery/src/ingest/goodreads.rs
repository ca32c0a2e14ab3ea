//! Goodreads library export adapter.
//!
//! Goodreads exports one CSV per library. The interesting quirks: ISBN cells
//! are wrapped in an Excel guard (`="9780441013593"`), "My Rating" uses 0
//! for unrated, and the exclusive shelf is the only trustworthy read-status
//! signal (bookshelves are free-form labels).

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{BinderyError, Result};
use crate::normalize::{isbn10_to_isbn13, normalize_isbn13};
use crate::record::{today, Record};

/// Load a Goodreads CSV export as records.
pub fn load_goodreads_export(path: impl AsRef<Path>) -> Result<Vec<Record>> {
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
    let index: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim(), i))
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(map_row(&row, &index));
    }
    Ok(records)
}

fn map_row(row: &csv::StringRecord, index: &HashMap<&str, usize>) -> Record {
    let cell = |name: &str| -> Option<String> {
        index
            .get(name)
            .and_then(|&i| row.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let mut record = Record::default();

    // Only a normalized ISBN survives; a dirty cell is worse than no cell.
    // The plain ISBN column holds ISBN-10s, so it gets a conversion pass.
    record.isbn13 = cell("ISBN13")
        .map(|raw| strip_excel_guard(&raw))
        .and_then(|raw| normalize_isbn13(&raw))
        .or_else(|| {
            cell("ISBN")
                .map(|raw| strip_excel_guard(&raw))
                .and_then(|raw| normalize_isbn13(&raw).or_else(|| isbn10_to_isbn13(&raw)))
        });

    record.title = cell("Title");
    record.author = cell("Author");
    record.publication_year = cell("Year Published").or_else(|| cell("Original Publication Year"));
    record.publisher = cell("Publisher");
    record.pages = cell("Number of Pages");

    if let Some(shelves) = cell("Bookshelves") {
        record.tags = shelves
            .split(',')
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
    }

    record.physical_owned = match cell("Owned Copies") {
        Some(raw) => raw.parse::<i64>().ok().map(|count| count > 0),
        None => Some(false),
    };
    record.kindle_owned = Some(false);
    record.audiobook_owned = Some(false);

    record.goodreads_id = cell("Book Id");
    record.goodreads_url = record
        .goodreads_id
        .as_deref()
        .map(|id| format!("https://www.goodreads.com/book/show/{id}"));
    record.sources.insert("goodreads".to_string());

    record.date_added = cell("Date Added").map(|raw| normalize_export_date(&raw));
    record.date_updated = Some(today());

    record.read_status = cell("Exclusive Shelf").and_then(|shelf| {
        match shelf.to_lowercase().as_str() {
            "read" => Some("read".to_string()),
            "currently-reading" => Some("reading".to_string()),
            "to-read" => Some("want_to_read".to_string()),
            _ => None,
        }
    });

    // Goodreads writes 0 for unrated.
    record.rating = cell("My Rating").filter(|r| r != "0" && r.parse::<u32>().is_ok());

    let read_count = cell("Read Count")
        .and_then(|raw| raw.parse::<i64>().ok())
        .unwrap_or(0);
    record.reread_count = Some(read_count.to_string());
    record.reread = Some(if read_count > 1 { "1" } else { "0" }.to_string());

    record.notes = match (cell("My Review"), cell("Private Notes")) {
        (Some(review), Some(notes)) => {
            Some(format!("My Review: {review}\n\nPrivate Notes: {notes}"))
        }
        (Some(review), None) => Some(format!("My Review: {review}")),
        (None, Some(notes)) => Some(format!("Private Notes: {notes}")),
        (None, None) => None,
    };

    record
}

/// Strip the `="..."` guard Goodreads wraps identifier cells in.
fn strip_excel_guard(cell: &str) -> String {
    cell.trim()
        .trim_start_matches('=')
        .trim_matches('"')
        .to_string()
}

/// Normalize an export date to YYYY-MM-DD (or YYYY-MM when only the month
/// is known). Anything unrecognized passes through untouched; validation
/// flags it later.
fn normalize_export_date(raw: &str) -> String {
    for format in ["%Y/%m/%d", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    if let Some((year, month)) = parse_year_month(raw) {
        return format!("{year:04}-{month:02}");
    }
    raw.to_string()
}

fn parse_year_month(raw: &str) -> Option<(i32, u32)> {
    let (year, month) = raw.split_once(['/', '-'])?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    ((1000..10000).contains(&year) && (1..=12).contains(&month)).then_some((year, month))
}
