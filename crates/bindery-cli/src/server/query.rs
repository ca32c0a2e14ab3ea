//! Pure query logic over a loaded collection.
//!
//! Everything here is a plain function over record slices so the behavior
//! is testable without a running server; handlers do parameter plumbing
//! only. Filters compare case-insensitively and treat blank fields as
//! absent, matching the store's blank-is-absent convention.

use std::collections::{BTreeSet, HashMap};

use bindery::Record;
use indexmap::IndexMap;
use serde::Serialize;

/// Default page size for the book listing.
pub const DEFAULT_LIMIT: usize = 50;
/// Hard cap on the page size.
pub const MAX_LIMIT: usize = 500;
/// Default result count for search.
pub const SEARCH_DEFAULT_LIMIT: usize = 20;
/// Hard cap on search results.
pub const SEARCH_MAX_LIMIT: usize = 100;
/// Number of genres reported by the stats endpoint.
const TOP_GENRES: usize = 10;

/// Listing filters. All criteria are conjunctive.
#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    pub read_status: Option<String>,
    pub genre: Option<String>,
    pub tag: Option<String>,
    pub has_rating: Option<bool>,
}

/// Sortable listing fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    Title,
    #[default]
    Author,
    Rating,
    DateRead,
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "author" => Ok(SortField::Author),
            "rating" => Ok(SortField::Rating),
            "date_read" => Ok(SortField::DateRead),
            _ => Err(format!(
                "Unknown sort field: {}. Use title, author, rating, or date_read.",
                s
            )),
        }
    }
}

/// Listing sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Unknown sort order: {}. Use asc or desc.", s)),
        }
    }
}

/// One search result: the record plus how it matched.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub record: Record,
    pub match_field: String,
    pub match_score: f64,
}

/// Distinct values available for listing filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub read_statuses: Vec<String>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub anchor_types: Vec<String>,
}

/// Summary statistics over the whole collection.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionStats {
    pub total_books: usize,
    pub read: usize,
    pub reading: usize,
    pub want_to_read: usize,
    pub unread: usize,
    pub dnf: usize,
    pub with_ratings: usize,
    /// Top genres by record count, highest first.
    pub by_genre: IndexMap<String, usize>,
}

/// Select records matching every given criterion, preserving input order.
pub fn filter_records<'a>(records: &'a [Record], filter: &BookFilter) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| {
            if let Some(status) = &filter.read_status {
                if !text_eq(record.read_status.as_deref(), status) {
                    return false;
                }
            }
            if let Some(genre) = &filter.genre {
                if !pipe_cell_contains(record.genres.as_deref(), genre) {
                    return false;
                }
            }
            if let Some(tag) = &filter.tag {
                let tag = tag.trim().to_lowercase();
                if !record.tags.iter().any(|t| t.to_lowercase() == tag) {
                    return false;
                }
            }
            if let Some(wanted) = filter.has_rating {
                if has_rating(record) != wanted {
                    return false;
                }
            }
            true
        })
        .collect()
}

/// Sort a filtered view. Ties keep their existing order.
pub fn sort_records(records: &mut [&Record], field: SortField, order: SortOrder) {
    records.sort_by(|a, b| {
        let ordering = match field {
            SortField::Title => text_key(a.title.as_deref()).cmp(&text_key(b.title.as_deref())),
            SortField::Author => text_key(a.author.as_deref()).cmp(&text_key(b.author.as_deref())),
            SortField::DateRead => {
                text_key(a.date_read.as_deref()).cmp(&text_key(b.date_read.as_deref()))
            }
            SortField::Rating => rating_value(a).total_cmp(&rating_value(b)),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Fields scanned by [`search_records`], in priority order.
const SEARCH_FIELDS: &[&str] = &["title", "author", "genres"];

/// Case-insensitive scored substring search.
///
/// Per field: exact match 1.0, prefix 0.8, contains 0.6. A record scores
/// its best field, earlier fields winning ties. Results are sorted by
/// score, highest first, then capped at `limit`.
pub fn search_records(records: &[Record], query: &str, limit: usize) -> Vec<SearchHit> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut hits = Vec::new();
    for record in records {
        let mut match_field = None;
        let mut match_score = 0.0_f64;

        for &field in SEARCH_FIELDS {
            let value = match field {
                "title" => record.title.as_deref(),
                "author" => record.author.as_deref(),
                "genres" => record.genres.as_deref(),
                _ => None,
            };
            let Some(value) = value.map(|v| v.trim().to_lowercase()).filter(|v| !v.is_empty())
            else {
                continue;
            };

            if value == query {
                match_score = 1.0;
                match_field = Some(field);
                break;
            } else if value.starts_with(&query) && match_score < 0.8 {
                match_score = 0.8;
                match_field = Some(field);
            } else if value.contains(&query) && match_score < 0.6 {
                match_score = 0.6;
                match_field = Some(field);
            }
        }

        if let Some(field) = match_field {
            hits.push(SearchHit {
                record: record.clone(),
                match_field: field.to_string(),
                match_score,
            });
        }
    }

    hits.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    hits.truncate(limit);
    hits
}

/// Collect the distinct values usable as listing filters, sorted.
pub fn filter_options(records: &[Record]) -> FilterOptions {
    let mut read_statuses = BTreeSet::new();
    let mut genres = BTreeSet::new();
    let mut tags = BTreeSet::new();
    let mut anchor_types = BTreeSet::new();

    for record in records {
        if let Some(status) = clean_lower(record.read_status.as_deref()) {
            read_statuses.insert(status);
        }
        if let Some(cell) = record.genres.as_deref() {
            for part in cell.split('|') {
                if let Some(genre) = clean_lower(Some(part)) {
                    genres.insert(genre);
                }
            }
        }
        for tag in &record.tags {
            if let Some(tag) = clean_lower(Some(tag.as_str())) {
                tags.insert(tag);
            }
        }
        if let Some(anchor) = record.anchor_type.as_deref() {
            let anchor = anchor.trim();
            if !anchor.is_empty() {
                anchor_types.insert(anchor.to_string());
            }
        }
    }

    FilterOptions {
        read_statuses: read_statuses.into_iter().collect(),
        genres: genres.into_iter().collect(),
        tags: tags.into_iter().collect(),
        anchor_types: anchor_types.into_iter().collect(),
    }
}

/// Compute summary statistics over the collection.
pub fn collection_stats(records: &[Record]) -> CollectionStats {
    let status_count = |status: &str| {
        records
            .iter()
            .filter(|r| text_eq(r.read_status.as_deref(), status))
            .count()
    };

    let mut genre_counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        if let Some(cell) = record.genres.as_deref() {
            for part in cell.split('|') {
                let part = part.trim().to_lowercase();
                if !part.is_empty() {
                    *genre_counts.entry(part).or_insert(0) += 1;
                }
            }
        }
    }
    let mut ranked: Vec<(String, usize)> = genre_counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let by_genre: IndexMap<String, usize> = ranked.into_iter().take(TOP_GENRES).collect();

    CollectionStats {
        total_books: records.len(),
        read: status_count("read"),
        reading: status_count("reading"),
        want_to_read: status_count("want_to_read"),
        unread: status_count("unread"),
        dnf: status_count("dnf"),
        with_ratings: records.iter().filter(|r| has_rating(r)).count(),
        by_genre,
    }
}

fn text_eq(value: Option<&str>, expected: &str) -> bool {
    value.map(|v| v.trim().to_lowercase()) == Some(expected.trim().to_lowercase())
}

fn pipe_cell_contains(cell: Option<&str>, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    cell.unwrap_or("")
        .split('|')
        .map(|part| part.trim().to_lowercase())
        .any(|part| !part.is_empty() && part == needle)
}

fn has_rating(record: &Record) -> bool {
    record
        .rating
        .as_deref()
        .and_then(|r| r.trim().parse::<f64>().ok())
        .is_some()
}

fn text_key(value: Option<&str>) -> String {
    value.unwrap_or("").trim().to_lowercase()
}

fn rating_value(record: &Record) -> f64 {
    record
        .rating
        .as_deref()
        .and_then(|r| r.trim().parse().ok())
        .unwrap_or(0.0)
}

fn clean_lower(value: Option<&str>) -> Option<String> {
    let value = value?.trim().to_lowercase();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
