//! Confidence-gated reconciliation of an incoming batch against a canonical
//! collection.
//!
//! Each incoming record is matched, gated, and either merged in place,
//! inserted alongside a discrepancy entry, or inserted as new. The canonical
//! set grows as the batch proceeds, so a record can match another record
//! from the same batch that was processed before it. No I/O happens here;
//! persistence is the caller's job, after the whole batch has succeeded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BinderyError, Result};
use crate::identity::generate_identity;
use crate::matching::{find_candidates, MatchCandidate, MatchTier};
use crate::merge::{merge, MergeNote, MergePolicy};
use crate::record::{today, Record};

/// Thresholds and merge policy for one reconciliation run.
///
/// The thresholds gate the fuzzy tier only. Identifier and exact-text
/// matches are deterministic signals and always merge; fuzzy scores merge at
/// or above `auto_merge_threshold`, land in the discrepancy report at or
/// above `report_threshold`, and are treated as new below that.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    pub auto_merge_threshold: f64,
    pub report_threshold: f64,
    pub policy: MergePolicy,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            auto_merge_threshold: 0.92,
            report_threshold: 0.80,
            policy: MergePolicy::default(),
        }
    }
}

impl ReconcileConfig {
    fn validate(&self) -> Result<()> {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if !in_range(self.auto_merge_threshold) || !in_range(self.report_threshold) {
            return Err(BinderyError::Config(
                "thresholds must be within 0.0..=1.0".to_string(),
            ));
        }
        if self.report_threshold > self.auto_merge_threshold {
            return Err(BinderyError::Config(format!(
                "report threshold {} exceeds auto-merge threshold {}",
                self.report_threshold, self.auto_merge_threshold
            )));
        }
        Ok(())
    }
}

/// Terminal disposition of one incoming record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    /// Never reached the matcher; skipped as malformed.
    #[default]
    Unresolved,
    /// Auto-merged into an existing canonical record.
    MatchedHigh,
    /// Report band: inserted as new with a discrepancy entry.
    MatchedAmbiguous,
    /// Inserted as a new canonical record.
    New,
}

/// Identifying fields of one side of a match, for reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRef {
    pub identity: String,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn13: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asin: Option<String>,
}

impl RecordRef {
    pub(crate) fn of(record: &Record) -> Self {
        Self {
            identity: record.work_id.clone().unwrap_or_default(),
            title: record.display_title().to_string(),
            author: record.display_author().to_string(),
            isbn13: record.isbn13.clone(),
            asin: record.asin.clone(),
        }
    }
}

/// An auto-merge that happened, with whatever the merge kept out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeEvent {
    pub existing: RecordRef,
    pub incoming: RecordRef,
    pub confidence: f64,
    pub tier: MatchTier,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<MergeNote>,
}

/// An ambiguous match: both records kept, surfaced for human review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscrepancyEntry {
    pub existing: RecordRef,
    pub incoming: RecordRef,
    pub confidence: f64,
    pub tier: MatchTier,
}

/// A record the batch skipped rather than guessed about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipWarning {
    /// Zero-based position in the incoming batch.
    pub position: usize,
    pub reason: String,
}

/// Counts for one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileStats {
    pub incoming: usize,
    pub merged: usize,
    pub ambiguous: usize,
    pub added: usize,
    pub skipped: usize,
    pub canonical_total: usize,
}

/// Everything a run produced besides the records themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub generated_at: DateTime<Utc>,
    pub stats: ReconcileStats,
    /// Disposition of each incoming record, in batch order.
    pub dispositions: Vec<RecordState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merges: Vec<MergeEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discrepancies: Vec<DiscrepancyEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SkipWarning>,
}

/// Final canonical records plus the report.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub records: Vec<Record>,
    pub report: ReconcileReport,
}

/// Reconcile `batch` against `canonical`, in stable batch order.
pub fn reconcile_batch(
    canonical: Vec<Record>,
    batch: Vec<Record>,
    config: &ReconcileConfig,
) -> Result<ReconcileOutcome> {
    config.validate()?;

    let mut records = canonical;
    let mut stats = ReconcileStats {
        incoming: batch.len(),
        ..ReconcileStats::default()
    };
    let mut dispositions = Vec::with_capacity(batch.len());
    let mut merges = Vec::new();
    let mut discrepancies = Vec::new();
    let mut warnings = Vec::new();

    for (position, incoming) in batch.into_iter().enumerate() {
        if is_malformed(&incoming) {
            warnings.push(SkipWarning {
                position,
                reason: "blank title".to_string(),
            });
            dispositions.push(RecordState::Unresolved);
            stats.skipped += 1;
            continue;
        }

        let candidates = find_candidates(&incoming, &records);
        let state = gate(candidates.first(), config);
        dispositions.push(state);

        match (state, candidates.first()) {
            (RecordState::MatchedHigh, Some(top)) => {
                let existing_ref = RecordRef::of(&records[top.index]);
                let outcome = merge(&records[top.index], &incoming, &config.policy);
                let mut merged = outcome.record;
                if outcome.changed {
                    merged.date_updated = Some(today());
                }
                merges.push(MergeEvent {
                    existing: existing_ref,
                    incoming: RecordRef::of(&incoming),
                    confidence: top.confidence,
                    tier: top.tier,
                    notes: outcome.notes,
                });
                records[top.index] = merged;
                stats.merged += 1;
            }
            (RecordState::MatchedAmbiguous, Some(top)) => {
                let existing_ref = RecordRef::of(&records[top.index]);
                let mut inserted = incoming;
                inserted.work_id = Some(generate_identity(&inserted));
                discrepancies.push(DiscrepancyEntry {
                    existing: existing_ref,
                    incoming: RecordRef::of(&inserted),
                    confidence: top.confidence,
                    tier: top.tier,
                });
                records.push(inserted);
                stats.ambiguous += 1;
            }
            _ => {
                let mut inserted = incoming;
                inserted.work_id = Some(generate_identity(&inserted));
                records.push(inserted);
                stats.added += 1;
            }
        }
    }

    stats.canonical_total = records.len();

    Ok(ReconcileOutcome {
        records,
        report: ReconcileReport {
            generated_at: Utc::now(),
            stats,
            dispositions,
            merges,
            discrepancies,
            warnings,
        },
    })
}

/// The confidence gate. Exact tiers are always a merge; fuzzy confidence is
/// compared against the thresholds.
fn gate(candidate: Option<&MatchCandidate>, config: &ReconcileConfig) -> RecordState {
    match candidate {
        Some(top) if top.tier != MatchTier::Fuzzy => RecordState::MatchedHigh,
        Some(top) if top.confidence >= config.auto_merge_threshold => RecordState::MatchedHigh,
        Some(top) if top.confidence >= config.report_threshold => RecordState::MatchedAmbiguous,
        _ => RecordState::New,
    }
}

fn is_malformed(record: &Record) -> bool {
    record
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .is_none()
}
