//! Duplicate detection over an existing collection.
//!
//! A read-only pairwise scan that reuses the match scorer. It never merges
//! anything; the output is a review list for a human to act on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matching::{score_pair, MatchTier};
use crate::record::Record;
use crate::reconcile::RecordRef;

/// Default reporting threshold for the duplicate scan.
pub const DUPLICATE_THRESHOLD: f64 = 0.80;

/// One likely-duplicate pair found in a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicatePair {
    pub left: RecordRef,
    pub right: RecordRef,
    pub confidence: f64,
    pub tier: MatchTier,
}

/// Report wrapper for the duplicate scan, suitable for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub generated_at: DateTime<Utc>,
    /// How many records were scanned.
    pub scanned: usize,
    pub pairs: Vec<DuplicatePair>,
}

impl DuplicateReport {
    pub fn new(scanned: usize, pairs: Vec<DuplicatePair>) -> Self {
        Self {
            generated_at: Utc::now(),
            scanned,
            pairs,
        }
    }
}

/// Scan a collection for likely duplicates.
///
/// Every unordered pair is scored once; pairs at or above `threshold` are
/// returned sorted by confidence, highest first. Records the scorer calls
/// distinct (different valid ISBNs) never appear, whatever their text looks
/// like.
pub fn find_duplicates(records: &[Record], threshold: f64) -> Vec<DuplicatePair> {
    let mut pairs = Vec::new();

    for (i, left) in records.iter().enumerate() {
        for right in &records[i + 1..] {
            let Some((confidence, tier)) = score_pair(left, right) else {
                continue;
            };
            if confidence >= threshold {
                pairs.push(DuplicatePair {
                    left: RecordRef::of(left),
                    right: RecordRef::of(right),
                    confidence,
                    tier,
                });
            }
        }
    }

    pairs.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, author: &str) -> Record {
        Record::default().with_title(title).with_author(author)
    }

    #[test]
    fn test_exact_isbn_pair_reported_at_full_confidence() {
        let records = vec![
            book("The Great Gatsby", "Fitzgerald, F. Scott").with_isbn13("9780743273565"),
            book("Great Gatsby", "F. Scott Fitzgerald").with_isbn13("978-0-7432-7356-5"),
        ];

        let pairs = find_duplicates(&records, DUPLICATE_THRESHOLD);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].confidence, 1.0);
        assert_eq!(pairs[0].tier, MatchTier::Isbn13);
    }

    #[test]
    fn test_different_isbns_never_reported() {
        let records = vec![
            book("Dune", "Herbert, Frank").with_isbn13("9780441013593"),
            book("Dune", "Herbert, Frank").with_isbn13("9780547928227"),
        ];

        let pairs = find_duplicates(&records, 0.0);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_each_unordered_pair_scored_once() {
        let records = vec![
            book("Dune", "Herbert, Frank").with_isbn13("9780441013593"),
            book("Dune", "Frank Herbert").with_isbn13("9780441013593"),
            book("Dune (50th Anniversary)", "Herbert, Frank").with_isbn13("9780441013593"),
        ];

        let pairs = find_duplicates(&records, DUPLICATE_THRESHOLD);
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn test_sorted_by_confidence_descending() {
        let records = vec![
            book("Storm Front", "Butcher, Jim"),
            book("Storm Front", "Butcher, Jim"),
            book("Hyperion", "Simmons, Dan").with_asin("B004G60EHS"),
            book("Hyperion", "Dan Simmons").with_asin("B004G60EHS"),
        ];

        let pairs = find_duplicates(&records, DUPLICATE_THRESHOLD);
        assert_eq!(pairs.len(), 2);
        assert!(pairs[0].confidence >= pairs[1].confidence);
        assert_eq!(pairs[0].tier, MatchTier::Asin);
        assert_eq!(pairs[1].tier, MatchTier::TitleAuthor);
    }

    #[test]
    fn test_threshold_filters_fuzzy_pairs() {
        // "storm front 2" vs "storm front": distance 2 over 13 chars = 0.846.
        let records = vec![
            book("Storm Front 2", "Butcher, Jim"),
            book("Storm Front", "Butcher, Jim"),
        ];

        let reported = find_duplicates(&records, 0.80);
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].tier, MatchTier::Fuzzy);

        let strict = find_duplicates(&records, 0.85);
        assert!(strict.is_empty());
    }

    #[test]
    fn test_report_carries_identities() {
        let mut first = book("Dune", "Herbert, Frank").with_isbn13("9780441013593");
        first.work_id = Some("isbn13:9780441013593".to_string());
        let records = vec![first, book("Dune", "Herbert, Frank").with_isbn13("9780441013593")];

        let pairs = find_duplicates(&records, DUPLICATE_THRESHOLD);
        assert_eq!(pairs[0].left.identity, "isbn13:9780441013593");
        assert_eq!(pairs[0].left.title, "Dune");
    }
}
