//! Kindle library export adapter.
//!
//! Kindle exports arrive as CSV or JSON depending on the extraction tool;
//! the extension decides which parser runs. JSON may be a bare array, an
//! object with a `books` array, or a single book object.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value;

use crate::error::{BinderyError, Result};
use crate::record::{today, Record};

/// Load a Kindle export, dispatching on the file extension.
pub fn load_kindle_export(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        _ => Err(BinderyError::UnsupportedFormat(format!(
            "'{}' is not a .csv or .json Kindle export",
            path.display()
        ))),
    }
}

fn load_csv(path: &Path) -> Result<Vec<Record>> {
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
        let cell = |name: &str| -> Option<String> {
            index
                .get(name)
                .and_then(|&i| row.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        records.push(make_record(
            cell("Title"),
            cell("Author"),
            cell("ASIN"),
            cell("ISBN").or_else(|| cell("ISBN13")),
            cell("Publication Date").or_else(|| cell("Year")),
            cell("Publisher"),
            cell("Pages"),
        ));
    }
    Ok(records)
}

fn load_json(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).map_err(|e| BinderyError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let value: Value = serde_json::from_reader(BufReader::new(file))?;

    let items: Vec<Value> = if let Value::Array(items) = value {
        items
    } else if let Some(books) = value.get("books").and_then(Value::as_array) {
        books.clone()
    } else if value.is_object() {
        vec![value]
    } else {
        return Err(BinderyError::InvalidCollection(format!(
            "'{}' is not a Kindle library JSON shape",
            path.display()
        )));
    };

    Ok(items
        .iter()
        .map(|item| {
            make_record(
                json_field(item, "Title"),
                json_field(item, "Author"),
                json_field(item, "ASIN"),
                json_field(item, "ISBN").or_else(|| json_field(item, "ISBN13")),
                json_field(item, "Publication Date").or_else(|| json_field(item, "Year")),
                json_field(item, "Publisher"),
                json_field(item, "Pages"),
            )
        })
        .collect())
}

/// Look a field up by its export name, tolerating lowercased keys.
fn json_field(item: &Value, name: &str) -> Option<String> {
    let raw = item
        .get(name)
        .or_else(|| item.get(name.to_lowercase()))?;
    let text = match raw {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

fn make_record(
    title: Option<String>,
    author: Option<String>,
    asin: Option<String>,
    isbn13: Option<String>,
    publication: Option<String>,
    publisher: Option<String>,
    pages: Option<String>,
) -> Record {
    let mut record = Record::default();
    record.title = title;
    record.author = author;
    record.asin = asin;
    record.isbn13 = isbn13;
    record.publication_year = publication.map(|p| extract_year(&p));
    record.publisher = publisher;
    record.pages = pages;

    record.formats.insert("kindle".to_string());
    record.kindle_owned = Some(true);
    record.physical_owned = Some(false);
    record.audiobook_owned = Some(false);
    record.sources.insert("kindle".to_string());
    record.read_status = Some("unread".to_string());
    record.date_added = Some(today());
    record.date_updated = Some(today());

    record
}

/// Publication dates come in many shapes; the leading four digits are the
/// year when they parse as one.
fn extract_year(publication: &str) -> String {
    let prefix: String = publication.chars().take(4).collect();
    if prefix.len() == 4 && prefix.chars().all(|c| c.is_ascii_digit()) {
        prefix
    } else {
        publication.trim().to_string()
    }
}
