//! The canonical bibliographic record and its field classes.

use std::collections::BTreeSet;

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Canonical column order for the persisted collection.
///
/// Every field of [`Record`] appears here exactly once. The store writes
/// columns in this order and the merge engine iterates text fields through
/// the same names, so adding a field means adding it to the struct and to
/// this list.
pub const COLUMNS: &[&str] = &[
    "work_id",
    "isbn13",
    "asin",
    "title",
    "author",
    "publication_year",
    "publisher",
    "language",
    "pages",
    "genres",
    "description",
    "tags",
    "formats",
    "sources",
    "physical_owned",
    "kindle_owned",
    "audiobook_owned",
    "goodreads_id",
    "goodreads_url",
    "date_added",
    "date_updated",
    "read_status",
    "date_read",
    "rating",
    "reread",
    "reread_count",
    "dnf",
    "dnf_reason",
    "pacing_rating",
    "tone",
    "vibe",
    "what_i_wanted",
    "did_it_deliver",
    "favorite_elements",
    "pet_peeves",
    "notes",
    "anchor_type",
    "would_recommend",
];

/// Text-valued fields addressable by name (everything except the sets and
/// the ownership flags). Order matches [`COLUMNS`].
pub const TEXT_FIELDS: &[&str] = &[
    "work_id",
    "isbn13",
    "asin",
    "title",
    "author",
    "publication_year",
    "publisher",
    "language",
    "pages",
    "genres",
    "description",
    "goodreads_id",
    "goodreads_url",
    "date_added",
    "date_updated",
    "read_status",
    "date_read",
    "rating",
    "reread",
    "reread_count",
    "dnf",
    "dnf_reason",
    "pacing_rating",
    "tone",
    "vibe",
    "what_i_wanted",
    "did_it_deliver",
    "favorite_elements",
    "pet_peeves",
    "notes",
    "anchor_type",
    "would_recommend",
];

/// Multi-valued fields, serialized pipe-delimited and sorted.
pub const SET_FIELDS: &[&str] = &["tags", "formats", "sources"];

/// Tri-state ownership flags ("1" / "0" / blank).
pub const FLAG_FIELDS: &[&str] = &["physical_owned", "kindle_owned", "audiobook_owned"];

/// One conceptual work in a collection.
///
/// Blank and absent are the same thing: the store maps empty cells to `None`
/// and `None` back to empty cells. Annotation fields hold the user's text
/// verbatim; they are never reinterpreted or reformatted by this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Stable identity. Permanent once assigned; prefixed with its
    /// derivation tier (`isbn13:`, `asin:`, `hash:`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_id: Option<String>,

    // Identifier fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn13: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asin: Option<String>,

    // Descriptive fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    // Multi-valued fields (sorted sets, pipe-delimited in CSV)
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub formats: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub sources: BTreeSet<String>,

    // Ownership flags. `None` is blank, `Some(false)` an explicit "0".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_owned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kindle_owned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audiobook_owned: Option<bool>,

    // External catalog identifiers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goodreads_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goodreads_url: Option<String>,

    // Bookkeeping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_added: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_updated: Option<String>,

    // Annotation fields: human-entered, protected once non-empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_read: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reread: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reread_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnf_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pacing_rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub what_i_wanted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_it_deliver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_elements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pet_peeves: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub would_recommend: Option<String>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder-style author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Builder-style ISBN-13.
    pub fn with_isbn13(mut self, isbn13: impl Into<String>) -> Self {
        self.isbn13 = Some(isbn13.into());
        self
    }

    /// Builder-style ASIN.
    pub fn with_asin(mut self, asin: impl Into<String>) -> Self {
        self.asin = Some(asin.into());
        self
    }

    /// Title for display in reports, or a placeholder when absent.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }

    /// Author for display in reports, or a placeholder when absent.
    pub fn display_author(&self) -> &str {
        self.author.as_deref().unwrap_or("(unknown)")
    }

    /// Read a text field by name. Returns `None` for set/flag fields and for
    /// names outside the schema.
    pub fn get_text(&self, field: &str) -> Option<&str> {
        self.text_slot(field).and_then(|v| v.as_deref())
    }

    /// Write a text field by name. Returns false for names that are not
    /// text fields.
    pub fn set_text(&mut self, field: &str, value: Option<String>) -> bool {
        let Some(slot) = self.text_slot_mut(field) else {
            return false;
        };
        *slot = value.filter(|v| !v.trim().is_empty());
        true
    }

    /// Read a multi-valued field by name.
    pub fn get_set(&self, field: &str) -> Option<&BTreeSet<String>> {
        match field {
            "tags" => Some(&self.tags),
            "formats" => Some(&self.formats),
            "sources" => Some(&self.sources),
            _ => None,
        }
    }

    /// Mutable access to a multi-valued field by name.
    pub fn get_set_mut(&mut self, field: &str) -> Option<&mut BTreeSet<String>> {
        match field {
            "tags" => Some(&mut self.tags),
            "formats" => Some(&mut self.formats),
            "sources" => Some(&mut self.sources),
            _ => None,
        }
    }

    /// Read an ownership flag by name.
    pub fn get_flag(&self, field: &str) -> Option<Option<bool>> {
        match field {
            "physical_owned" => Some(self.physical_owned),
            "kindle_owned" => Some(self.kindle_owned),
            "audiobook_owned" => Some(self.audiobook_owned),
            _ => None,
        }
    }

    /// Write an ownership flag by name. Returns false for non-flag names.
    pub fn set_flag(&mut self, field: &str, value: Option<bool>) -> bool {
        match field {
            "physical_owned" => self.physical_owned = value,
            "kindle_owned" => self.kindle_owned = value,
            "audiobook_owned" => self.audiobook_owned = value,
            _ => return false,
        }
        true
    }

    /// Serialize one field to its CSV cell.
    pub fn csv_cell(&self, field: &str) -> String {
        if let Some(set) = self.get_set(field) {
            return join_set(set);
        }
        if let Some(flag) = self.get_flag(field) {
            return flag_cell(flag);
        }
        self.get_text(field).unwrap_or_default().to_string()
    }

    /// Populate one field from its CSV cell.
    pub fn set_csv_cell(&mut self, field: &str, cell: &str) {
        if let Some(set) = self.get_set_mut(field) {
            *set = parse_set(cell);
            return;
        }
        if FLAG_FIELDS.contains(&field) {
            self.set_flag(field, parse_flag(cell));
            return;
        }
        self.set_text(field, clean_cell(cell));
    }

    fn text_slot(&self, field: &str) -> Option<&Option<String>> {
        Some(match field {
            "work_id" => &self.work_id,
            "isbn13" => &self.isbn13,
            "asin" => &self.asin,
            "title" => &self.title,
            "author" => &self.author,
            "publication_year" => &self.publication_year,
            "publisher" => &self.publisher,
            "language" => &self.language,
            "pages" => &self.pages,
            "genres" => &self.genres,
            "description" => &self.description,
            "goodreads_id" => &self.goodreads_id,
            "goodreads_url" => &self.goodreads_url,
            "date_added" => &self.date_added,
            "date_updated" => &self.date_updated,
            "read_status" => &self.read_status,
            "date_read" => &self.date_read,
            "rating" => &self.rating,
            "reread" => &self.reread,
            "reread_count" => &self.reread_count,
            "dnf" => &self.dnf,
            "dnf_reason" => &self.dnf_reason,
            "pacing_rating" => &self.pacing_rating,
            "tone" => &self.tone,
            "vibe" => &self.vibe,
            "what_i_wanted" => &self.what_i_wanted,
            "did_it_deliver" => &self.did_it_deliver,
            "favorite_elements" => &self.favorite_elements,
            "pet_peeves" => &self.pet_peeves,
            "notes" => &self.notes,
            "anchor_type" => &self.anchor_type,
            "would_recommend" => &self.would_recommend,
            _ => return None,
        })
    }

    fn text_slot_mut(&mut self, field: &str) -> Option<&mut Option<String>> {
        Some(match field {
            "work_id" => &mut self.work_id,
            "isbn13" => &mut self.isbn13,
            "asin" => &mut self.asin,
            "title" => &mut self.title,
            "author" => &mut self.author,
            "publication_year" => &mut self.publication_year,
            "publisher" => &mut self.publisher,
            "language" => &mut self.language,
            "pages" => &mut self.pages,
            "genres" => &mut self.genres,
            "description" => &mut self.description,
            "goodreads_id" => &mut self.goodreads_id,
            "goodreads_url" => &mut self.goodreads_url,
            "date_added" => &mut self.date_added,
            "date_updated" => &mut self.date_updated,
            "read_status" => &mut self.read_status,
            "date_read" => &mut self.date_read,
            "rating" => &mut self.rating,
            "reread" => &mut self.reread,
            "reread_count" => &mut self.reread_count,
            "dnf" => &mut self.dnf,
            "dnf_reason" => &mut self.dnf_reason,
            "pacing_rating" => &mut self.pacing_rating,
            "tone" => &mut self.tone,
            "vibe" => &mut self.vibe,
            "what_i_wanted" => &mut self.what_i_wanted,
            "did_it_deliver" => &mut self.did_it_deliver,
            "favorite_elements" => &mut self.favorite_elements,
            "pet_peeves" => &mut self.pet_peeves,
            "notes" => &mut self.notes,
            "anchor_type" => &mut self.anchor_type,
            "would_recommend" => &mut self.would_recommend,
            _ => return None,
        })
    }
}

/// Trim a cell; empty becomes `None`.
pub fn clean_cell(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a pipe-delimited cell into a set, dropping blanks.
pub fn parse_set(cell: &str) -> BTreeSet<String> {
    cell.split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Serialize a set as sorted, pipe-delimited text.
pub fn join_set(set: &BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join("|")
}

/// Parse a flag cell. Unrecognized text is treated as blank; validation
/// reports it separately.
pub fn parse_flag(cell: &str) -> Option<bool> {
    match cell.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Serialize a flag cell ("1", "0", or blank).
pub fn flag_cell(flag: Option<bool>) -> String {
    match flag {
        Some(true) => "1".to_string(),
        Some(false) => "0".to_string(),
        None => String::new(),
    }
}

/// Today's date in the collection's date-cell format.
pub(crate) fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
