//! Free-text shelf inventory adapter.
//!
//! Takes a plain-text inventory of physical shelves, one book per line (or
//! a title line followed by an author line), and turns it into records
//! marked as physically owned. Lines come from whatever produced the
//! inventory, so the parser is a forgiving heuristic: it recognizes a few
//! spine-label shapes and drops obvious noise.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::{BinderyError, Result};
use crate::record::{today, Record};

/// Read a shelf inventory file and parse it into records.
pub fn load_shelf_inventory(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| BinderyError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(parse_shelf_lines(&text))
}

/// Parse inventory text into records.
///
/// Recognized line shapes, tried in order:
/// - `Title by Author`
/// - `Title - Author` (hyphen or en dash)
/// - a title line followed by a shorter proper-cased author line
/// - a bare title (author left empty)
///
/// Lines under three characters are treated as noise, and a bare line only
/// counts as a title when it is long enough to plausibly be one.
pub fn parse_shelf_lines(text: &str) -> Vec<Record> {
    // Both patterns are anchored on surrounding whitespace so hyphenated
    // titles and authors like "Day-Lewis" survive.
    let by_separator = Regex::new(r"(?i)\s+by\s+").unwrap();
    let dash_separator = Regex::new(r"\s+[-\u{2013}]\s+").unwrap();

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut records = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if line.len() < 3 {
            i += 1;
            continue;
        }

        if let Some(record) = split_pair(&by_separator, line) {
            records.push(record);
            i += 1;
            continue;
        }

        if let Some(record) = split_pair(&dash_separator, line) {
            records.push(record);
            i += 1;
            continue;
        }

        if let Some(&author_line) = lines.get(i + 1) {
            if looks_like_title_author_pair(line, author_line) {
                records.push(shelf_record(line, Some(author_line)));
                i += 2;
                continue;
            }
        }

        if line.len() > 5 && line.contains(' ') {
            records.push(shelf_record(line, None));
        }

        i += 1;
    }

    records
}

/// Split a line on a separator that must occur exactly once.
fn split_pair(separator: &Regex, line: &str) -> Option<Record> {
    let parts: Vec<&str> = separator.split(line).collect();
    match parts.as_slice() {
        [title, author] if !title.trim().is_empty() && !author.trim().is_empty() => {
            Some(shelf_record(title.trim(), Some(author.trim())))
        }
        _ => None,
    }
}

/// Heuristic for the two-line shape: the title line is the longer one and
/// the author line is a short proper-cased name.
fn looks_like_title_author_pair(line: &str, next: &str) -> bool {
    let starts_upper = |s: &str| s.chars().next().is_some_and(char::is_uppercase);
    line.len() > next.len()
        && starts_upper(line)
        && starts_upper(next)
        && next.split_whitespace().count() <= 4
}

fn shelf_record(title: &str, author: Option<&str>) -> Record {
    let mut record = Record::default().with_title(title);
    if let Some(author) = author {
        record.author = Some(author.to_string());
    }

    record.formats.insert("physical".to_string());
    record.physical_owned = Some(true);
    record.kindle_owned = Some(false);
    record.audiobook_owned = Some(false);
    record.sources.insert("shelves".to_string());
    record.date_added = Some(today());
    record.date_updated = Some(today());
    record.reread = Some("0".to_string());
    record.reread_count = Some("0".to_string());
    record.dnf = Some("0".to_string());

    record
}
