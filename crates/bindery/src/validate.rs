//! Collection validation.
//!
//! Scans a collection for data quality problems and reports them with
//! severities. Validation never mutates records and never fixes anything;
//! the report is the whole output.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::IdentityTier;
use crate::normalize::{normalize_asin, normalize_isbn13};
use crate::record::{Record, SET_FIELDS};
use crate::reconcile::RecordRef;

/// Accepted `read_status` values.
pub const READ_STATUSES: &[&str] = &["read", "reading", "want_to_read", "unread", "dnf"];

/// Accepted `anchor_type` values.
pub const ANCHOR_TYPES: &[&str] = &["all_time_favorite", "recent_hit", "recent_miss", "dnf"];

/// Severity of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only, may not require action.
    Info,
    /// Potential issue that should be reviewed.
    Warning,
    /// Definite issue that should be addressed.
    Error,
}

impl Severity {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// One problem found in the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Affected field, or a collection-level scope like "collection".
    pub field: String,
    pub message: String,
    /// The record the issue belongs to, absent for cross-record issues.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<RecordRef>,
}

/// Everything the validation pass found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub generated_at: DateTime<Utc>,
    /// How many records were checked.
    pub checked: usize,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn new(checked: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            checked,
            issues: Vec::new(),
        }
    }

    fn add(
        &mut self,
        severity: Severity,
        field: &str,
        message: impl Into<String>,
        record: Option<&Record>,
    ) {
        self.issues.push(ValidationIssue {
            severity,
            field: field.to_string(),
            message: message.into(),
            record: record.map(RecordRef::of),
        });
    }

    /// True when no errors were found (warnings and info are fine).
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn info_count(&self) -> usize {
        self.count(Severity::Info)
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// Issues of one severity, in detection order.
    pub fn issues_at(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }
}

/// Run every check against the collection.
pub fn validate_collection(records: &[Record]) -> ValidationReport {
    let mut report = ValidationReport::new(records.len());

    if records.is_empty() {
        report.add(Severity::Error, "collection", "no records found", None);
        return report;
    }

    check_required_fields(records, &mut report);
    check_identifier_formats(records, &mut report);
    check_duplicate_identifiers(records, &mut report);
    check_identity_prefixes(records, &mut report);
    check_ratings(records, &mut report);
    check_reread_counts(records, &mut report);
    check_dates(records, &mut report);
    check_vocabularies(records, &mut report);
    check_format_flags(records, &mut report);
    check_anchor_completeness(records, &mut report);
    check_set_hygiene(records, &mut report);

    report
}

fn check_required_fields(records: &[Record], report: &mut ValidationReport) {
    for record in records {
        if record.title.is_none() {
            report.add(Severity::Error, "title", "missing required field", Some(record));
        }
        if record.author.is_none() {
            report.add(Severity::Error, "author", "missing required field", Some(record));
        }
    }
}

fn check_identifier_formats(records: &[Record], report: &mut ValidationReport) {
    for record in records {
        if let Some(raw) = record.isbn13.as_deref() {
            if normalize_isbn13(raw).is_none() {
                report.add(
                    Severity::Error,
                    "isbn13",
                    format!("invalid ISBN-13: {raw}"),
                    Some(record),
                );
            }
        }
        if let Some(raw) = record.asin.as_deref() {
            if normalize_asin(raw).is_none() {
                report.add(
                    Severity::Error,
                    "asin",
                    format!("invalid ASIN: {raw}"),
                    Some(record),
                );
            }
        }
    }
}

fn check_duplicate_identifiers(records: &[Record], report: &mut ValidationReport) {
    let mut by_isbn: HashMap<String, Vec<&Record>> = HashMap::new();
    let mut by_asin: HashMap<String, Vec<&Record>> = HashMap::new();
    let mut by_identity: HashMap<String, Vec<&Record>> = HashMap::new();

    for record in records {
        if let Some(isbn) = record.isbn13.as_deref().and_then(normalize_isbn13) {
            by_isbn.entry(isbn).or_default().push(record);
        }
        if let Some(asin) = record.asin.as_deref().and_then(normalize_asin) {
            by_asin.entry(asin).or_default().push(record);
        }
        if let Some(id) = record.work_id.as_deref() {
            if !id.trim().is_empty() {
                by_identity.entry(id.trim().to_string()).or_default().push(record);
            }
        }
    }

    report_collisions(&by_isbn, "isbn13", Severity::Error, report);
    report_collisions(&by_asin, "asin", Severity::Warning, report);
    report_collisions(&by_identity, "work_id", Severity::Error, report);
}

fn report_collisions(
    groups: &HashMap<String, Vec<&Record>>,
    field: &str,
    severity: Severity,
    report: &mut ValidationReport,
) {
    // Sorted so the report is deterministic across runs.
    let mut keys: Vec<&String> = groups.keys().collect();
    keys.sort();

    for key in keys {
        let members = &groups[key];
        if members.len() < 2 {
            continue;
        }
        let titles: Vec<&str> = members.iter().map(|r| r.display_title()).collect();
        report.add(
            severity,
            field,
            format!(
                "duplicate {field} {key} in {} records: {}",
                members.len(),
                titles.join(", ")
            ),
            None,
        );
    }
}

fn check_identity_prefixes(records: &[Record], report: &mut ValidationReport) {
    for record in records {
        let Some(id) = record.work_id.as_deref() else {
            continue;
        };
        if IdentityTier::of(id).is_none() {
            report.add(
                Severity::Warning,
                "work_id",
                format!("identity without a recognized prefix: {id}"),
                Some(record),
            );
        }
    }
}

fn check_ratings(records: &[Record], report: &mut ValidationReport) {
    for record in records {
        let Some(raw) = record.rating.as_deref() else {
            continue;
        };
        let Ok(value) = raw.parse::<f64>() else {
            report.add(
                Severity::Error,
                "rating",
                format!("not a number: {raw}"),
                Some(record),
            );
            continue;
        };
        if !(1.0..=5.0).contains(&value) {
            report.add(
                Severity::Error,
                "rating",
                format!("out of range 1-5: {value}"),
                Some(record),
            );
        } else if (value * 2.0).fract() != 0.0 {
            report.add(
                Severity::Error,
                "rating",
                format!("not a half-step: {value}"),
                Some(record),
            );
        }
    }
}

fn check_reread_counts(records: &[Record], report: &mut ValidationReport) {
    for record in records {
        let Some(raw) = record.reread_count.as_deref() else {
            continue;
        };
        match raw.parse::<i64>() {
            Ok(count) if count < 0 => {
                report.add(
                    Severity::Warning,
                    "reread_count",
                    format!("negative: {count}"),
                    Some(record),
                );
            }
            Ok(_) => {}
            Err(_) => {
                report.add(
                    Severity::Error,
                    "reread_count",
                    format!("not an integer: {raw}"),
                    Some(record),
                );
            }
        }
    }
}

fn check_dates(records: &[Record], report: &mut ValidationReport) {
    for record in records {
        for field in ["date_added", "date_read", "date_updated"] {
            let Some(raw) = record.get_text(field) else {
                continue;
            };
            if !is_valid_date(raw) {
                report.add(
                    Severity::Warning,
                    field,
                    format!("expected YYYY-MM-DD or YYYY-MM: {raw}"),
                    Some(record),
                );
            }
        }
    }
}

/// Accepts full dates and year-month values.
fn is_valid_date(raw: &str) -> bool {
    if NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok() {
        return true;
    }
    // YYYY-MM: validate as the first of that month.
    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").is_ok()
        && raw.chars().filter(|c| *c == '-').count() == 1
}

fn check_vocabularies(records: &[Record], report: &mut ValidationReport) {
    for record in records {
        if let Some(status) = record.read_status.as_deref() {
            if !READ_STATUSES.contains(&status.to_lowercase().as_str()) {
                report.add(
                    Severity::Error,
                    "read_status",
                    format!(
                        "unknown status: {status} (expected one of {})",
                        READ_STATUSES.join(", ")
                    ),
                    Some(record),
                );
            }
        }
        if let Some(anchor) = record.anchor_type.as_deref() {
            if !ANCHOR_TYPES.contains(&anchor.to_lowercase().as_str()) {
                report.add(
                    Severity::Warning,
                    "anchor_type",
                    format!("unknown anchor type: {anchor}"),
                    Some(record),
                );
            }
        }
    }
}

fn check_format_flags(records: &[Record], report: &mut ValidationReport) {
    let expectations = [
        ("kindle", "kindle_owned"),
        ("physical", "physical_owned"),
        ("audiobook", "audiobook_owned"),
    ];

    for record in records {
        for (format, flag) in expectations {
            let listed = record.formats.iter().any(|f| f.eq_ignore_ascii_case(format));
            let owned = record.get_flag(flag).flatten().unwrap_or(false);
            if listed && !owned {
                report.add(
                    Severity::Warning,
                    flag,
                    format!("formats lists '{format}' but {flag} is not set"),
                    Some(record),
                );
            }
        }
    }
}

fn check_anchor_completeness(records: &[Record], report: &mut ValidationReport) {
    for record in records {
        let Some(anchor) = record.anchor_type.as_deref() else {
            continue;
        };
        if !ANCHOR_TYPES.contains(&anchor) {
            continue;
        }

        if record.rating.is_none() {
            report.add(
                Severity::Warning,
                "rating",
                format!("anchor book ({anchor}) has no rating"),
                Some(record),
            );
        }
        if anchor == "all_time_favorite" {
            if record.favorite_elements.is_none() {
                report.add(
                    Severity::Warning,
                    "favorite_elements",
                    "all-time favorite has no favorite_elements",
                    Some(record),
                );
            }
            if record.tone.is_none() && record.vibe.is_none() {
                report.add(
                    Severity::Warning,
                    "tone",
                    "all-time favorite has neither tone nor vibe",
                    Some(record),
                );
            }
        }
        if anchor == "recent_miss" && record.pet_peeves.is_none() && record.dnf_reason.is_none() {
            report.add(
                Severity::Warning,
                "pet_peeves",
                "recent miss has neither pet_peeves nor dnf_reason",
                Some(record),
            );
        }
    }
}

fn check_set_hygiene(records: &[Record], report: &mut ValidationReport) {
    for record in records {
        for field in SET_FIELDS {
            let Some(set) = record.get_set(field) else {
                continue;
            };
            for entry in set {
                if entry.contains(',') {
                    report.add(
                        Severity::Warning,
                        field,
                        format!("entry '{entry}' contains a comma; values are pipe-delimited"),
                        Some(record),
                    );
                }
            }
        }
        for tag in &record.tags {
            if tag.chars().any(|c| c.is_uppercase()) {
                report.add(
                    Severity::Info,
                    "tags",
                    format!("tag '{tag}' is not lowercase"),
                    Some(record),
                );
            }
        }
    }
}
