//! Safe merging of a matched record pair.
//!
//! The existing record is authoritative. Incoming values only ever fill
//! blanks; they never replace what is already there. Protected fields are
//! listed in [`MergePolicy`] as data, so extending the protected set is a
//! configuration change rather than a code change.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::record::{flag_cell, Record, FLAG_FIELDS, TEXT_FIELDS};

/// Fields never overwritten by automated processing once non-empty.
///
/// The default set covers the stable identity plus every human-entered
/// annotation field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergePolicy {
    pub protected: BTreeSet<String>,
}

impl Default for MergePolicy {
    fn default() -> Self {
        let protected = [
            "work_id",
            "rating",
            "read_status",
            "date_read",
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
        ]
        .into_iter()
        .map(String::from)
        .collect();
        Self { protected }
    }
}

impl MergePolicy {
    /// Whether a field is protected from automated overwrites.
    pub fn is_protected(&self, field: &str) -> bool {
        self.protected.contains(field)
    }

    /// Builder-style addition of a protected field.
    pub fn protect(mut self, field: impl Into<String>) -> Self {
        self.protected.insert(field.into());
        self
    }
}

/// A value the merge kept out of the merged record, surfaced for reporting
/// instead of being embedded into user-visible text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeNote {
    pub field: String,
    pub kept: String,
    pub discarded: String,
    /// True when the field was protected; false for an ordinary
    /// existing-wins conflict on a descriptive field.
    pub protected: bool,
}

/// Result of merging one pair. `changed` is true only when the merged
/// record differs from the existing one, which lets callers stamp
/// bookkeeping dates without breaking idempotence.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub record: Record,
    pub notes: Vec<MergeNote>,
    pub changed: bool,
}

/// Bookkeeping fields fill like descriptive fields but never produce
/// conflict notes; differing update stamps are expected, not noteworthy.
const BOOKKEEPING_FIELDS: &[&str] = &["date_added", "date_updated"];

/// Merge `incoming` into `existing` without mutating either.
///
/// Field rules:
/// - stable identity: always the existing record's, never filled from the
///   incoming side;
/// - protected fields: existing value stands once non-empty, incoming fills
///   blanks only;
/// - identifier/descriptive fields: fill if empty; on a conflict the
///   existing value wins and a [`MergeNote`] records what was discarded;
/// - multi-valued fields: sorted union;
/// - ownership flags: fill if blank, conflicts keep existing and are noted.
pub fn merge(existing: &Record, incoming: &Record, policy: &MergePolicy) -> MergeOutcome {
    let mut merged = existing.clone();
    let mut notes = Vec::new();
    let mut changed = false;

    if let Some(incoming_id) = non_empty(incoming.work_id.as_deref()) {
        let existing_id = existing.work_id.as_deref().unwrap_or("");
        if existing_id != incoming_id {
            notes.push(MergeNote {
                field: "work_id".to_string(),
                kept: existing_id.to_string(),
                discarded: incoming_id.to_string(),
                protected: true,
            });
        }
    }

    for &field in TEXT_FIELDS {
        if field == "work_id" {
            continue;
        }
        let Some(incoming_value) = non_empty(incoming.get_text(field)) else {
            continue;
        };
        match non_empty(existing.get_text(field)) {
            None => {
                merged.set_text(field, Some(incoming_value.to_string()));
                changed = true;
            }
            Some(existing_value) if existing_value != incoming_value => {
                if BOOKKEEPING_FIELDS.contains(&field) {
                    continue;
                }
                notes.push(MergeNote {
                    field: field.to_string(),
                    kept: existing_value.to_string(),
                    discarded: incoming_value.to_string(),
                    protected: policy.is_protected(field),
                });
            }
            Some(_) => {}
        }
    }

    changed |= union_into(&mut merged.tags, &incoming.tags);
    changed |= union_into(&mut merged.formats, &incoming.formats);
    changed |= union_into(&mut merged.sources, &incoming.sources);

    for &field in FLAG_FIELDS {
        let Some(Some(incoming_flag)) = incoming.get_flag(field) else {
            continue;
        };
        match existing.get_flag(field) {
            Some(None) => {
                merged.set_flag(field, Some(incoming_flag));
                changed = true;
            }
            Some(Some(existing_flag)) if existing_flag != incoming_flag => {
                notes.push(MergeNote {
                    field: field.to_string(),
                    kept: flag_cell(Some(existing_flag)),
                    discarded: flag_cell(Some(incoming_flag)),
                    protected: policy.is_protected(field),
                });
            }
            _ => {}
        }
    }

    MergeOutcome {
        record: merged,
        notes,
        changed,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn union_into(dst: &mut BTreeSet<String>, src: &BTreeSet<String>) -> bool {
    let before = dst.len();
    dst.extend(src.iter().cloned());
    dst.len() != before
}
