//! Multi-tier match scoring between an incoming record and a canonical set.
//!
//! Tiers are evaluated in strict priority order and short-circuit at the
//! first tier where both records offer a comparison basis. Two records
//! carrying different valid ISBNs are distinct editions, full stop; text
//! similarity is never consulted once an identifier has spoken. The fuzzy
//! tier runs only when neither record carries any identifier at all, and
//! combines title and author similarity with `min` rather than an average:
//! a strong title match cannot compensate for a weak author match. The
//! scoring bias throughout is to prefer false negatives over false merges.

use std::fmt;

use serde::{Deserialize, Serialize};
use strsim::levenshtein;

use crate::normalize::{normalize_asin, normalize_isbn13, normalize_person_name, normalize_title};
use crate::record::Record;

/// Confidence assigned to an equal valid ISBN-13 pair.
pub const CONFIDENCE_ISBN13: f64 = 1.0;
/// Confidence assigned to an equal ASIN pair.
pub const CONFIDENCE_ASIN: f64 = 0.95;
/// Confidence assigned to an exact normalized title + author match.
pub const CONFIDENCE_TITLE_AUTHOR: f64 = 0.90;
/// Fuzzy scores below this floor are not candidates at all.
pub const FUZZY_FLOOR: f64 = 0.5;

/// Which tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Equal valid ISBN-13 on both records.
    Isbn13,
    /// Equal ASIN on both records.
    Asin,
    /// Exact normalized title and author.
    TitleAuthor,
    /// Edit-distance similarity on title and author, identifier-free only.
    Fuzzy,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchTier::Isbn13 => "isbn13",
            MatchTier::Asin => "asin",
            MatchTier::TitleAuthor => "title_author",
            MatchTier::Fuzzy => "fuzzy",
        };
        write!(f, "{label}")
    }
}

/// One ranked match against the canonical set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Position of the matched record in the canonical set.
    pub index: usize,
    /// Score in [0, 1].
    pub confidence: f64,
    /// Tier that produced the score.
    pub tier: MatchTier,
}

/// Normalized comparison view of a record, computed once per comparison
/// side.
struct MatchKey {
    isbn13: Option<String>,
    asin: Option<String>,
    title: String,
    author: String,
}

impl MatchKey {
    fn of(record: &Record) -> Self {
        Self {
            isbn13: record.isbn13.as_deref().and_then(normalize_isbn13),
            asin: record.asin.as_deref().and_then(normalize_asin),
            title: normalize_title(record.title.as_deref().unwrap_or("")),
            author: normalize_person_name(record.author.as_deref().unwrap_or("")),
        }
    }

    fn has_identifier(&self) -> bool {
        self.isbn13.is_some() || self.asin.is_some()
    }
}

/// Score a single pair of records. `None` means the pair is not a
/// candidate: either an identifier tier ruled them distinct, the fuzzy tier
/// was gated off, or similarity fell below the floor.
pub fn score_pair(a: &Record, b: &Record) -> Option<(f64, MatchTier)> {
    score_keys(&MatchKey::of(a), &MatchKey::of(b))
}

fn score_keys(a: &MatchKey, b: &MatchKey) -> Option<(f64, MatchTier)> {
    if let (Some(x), Some(y)) = (&a.isbn13, &b.isbn13) {
        return (x == y).then_some((CONFIDENCE_ISBN13, MatchTier::Isbn13));
    }

    if let (Some(x), Some(y)) = (&a.asin, &b.asin) {
        return (x == y).then_some((CONFIDENCE_ASIN, MatchTier::Asin));
    }

    if !a.title.is_empty() && a.title == b.title && a.author == b.author {
        return Some((CONFIDENCE_TITLE_AUTHOR, MatchTier::TitleAuthor));
    }

    // Fuzzy comparison is a fallback for identifier-free records only. An
    // identifier on either side is a stronger signal than any text score.
    if a.has_identifier() || b.has_identifier() {
        return None;
    }
    if a.title.is_empty() || b.title.is_empty() {
        return None;
    }

    let title_sim = similarity(&a.title, &b.title);
    if title_sim < FUZZY_FLOOR {
        return None;
    }
    let confidence = title_sim.min(similarity(&a.author, &b.author));
    (confidence >= FUZZY_FLOOR).then_some((confidence, MatchTier::Fuzzy))
}

/// Rank every canonical record against the incoming one.
///
/// Results are sorted by confidence descending; the sort is stable, so equal
/// confidences keep canonical insertion order.
pub fn find_candidates(incoming: &Record, canonical: &[Record]) -> Vec<MatchCandidate> {
    let key = MatchKey::of(incoming);
    let mut candidates: Vec<MatchCandidate> = canonical
        .iter()
        .enumerate()
        .filter_map(|(index, existing)| {
            score_keys(&key, &MatchKey::of(existing)).map(|(confidence, tier)| MatchCandidate {
                index,
                confidence,
                tier,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates
}

/// Normalized edit-distance ratio in [0, 1]. Equal strings (including two
/// empty strings) score 1.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein(a, b);
    1.0 - (distance as f64 / max_len as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, author: &str) -> Record {
        Record::new().with_title(title).with_author(author)
    }

    #[test]
    fn test_similarity_ratio() {
        assert_eq!(similarity("storm front", "storm front"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abcd", "wxyz"), 0.0);

        // two inserts over 13 chars
        let sim = similarity("storm front 2", "storm front");
        assert!((sim - (1.0 - 2.0 / 13.0)).abs() < 1e-9);
    }

    #[test]
    fn test_equal_isbn_is_certain() {
        let a = record("The Great Gatsby", "F. Scott Fitzgerald").with_isbn13("9780743273565");
        let b = record("great gatsby", "Fitzgerald, F. Scott").with_isbn13("978-0-7432-7356-5");

        let (confidence, tier) = score_pair(&a, &b).unwrap();
        assert_eq!(confidence, CONFIDENCE_ISBN13);
        assert_eq!(tier, MatchTier::Isbn13);
    }

    #[test]
    fn test_different_isbns_are_distinct_editions() {
        // Same text, different identifiers: the identifier tier decides and
        // nothing below it runs.
        let a = record("Dune", "Frank Herbert").with_isbn13("9780441013593");
        let b = record("Dune", "Frank Herbert").with_isbn13("9780743273565");

        assert_eq!(score_pair(&a, &b), None);
    }

    #[test]
    fn test_equal_asin() {
        let a = record("Storm Front", "Jim Butcher").with_asin("B000W93CNG");
        let b = record("Storm Front", "Butcher, Jim").with_asin("b000w93cng");

        let (confidence, tier) = score_pair(&a, &b).unwrap();
        assert_eq!(confidence, CONFIDENCE_ASIN);
        assert_eq!(tier, MatchTier::Asin);
    }

    #[test]
    fn test_exact_text_across_identifier_kinds() {
        // One side has only an ISBN, the other only an ASIN: no identifier
        // tier has a basis, so the exact-text tier decides.
        let a = record("The Storm Front", "Butcher, Jim").with_isbn13("9780451457813");
        let b = record("storm front", "Jim Butcher").with_asin("B000W93CNG");

        let (confidence, tier) = score_pair(&a, &b).unwrap();
        assert_eq!(confidence, CONFIDENCE_TITLE_AUTHOR);
        assert_eq!(tier, MatchTier::TitleAuthor);
    }

    #[test]
    fn test_fuzzy_gated_by_any_identifier() {
        let a = record("Storm Front 2", "Jim Butcher").with_isbn13("9780451457813");
        let b = record("Storm Front", "Jim Butcher");

        assert_eq!(score_pair(&a, &b), None);
    }

    #[test]
    fn test_fuzzy_conjunction_takes_minimum() {
        let a = record("Storm Front 2", "Jim Butcher");
        let b = record("Storm Front", "Jim Butcher");

        let (confidence, tier) = score_pair(&a, &b).unwrap();
        assert_eq!(tier, MatchTier::Fuzzy);
        // identical authors, so the title ratio is the minimum
        assert!((confidence - (1.0 - 2.0 / 13.0)).abs() < 1e-9);

        // a weak author match drags the pair down even with the same title gap
        let c = record("Storm Front 2", "John Smith");
        let d = record("Storm Front", "Anne Smyth");
        let (weak, _) = score_pair(&c, &d).unwrap();
        assert!(weak < 0.6, "expected a weak conjunction, got {weak}");
    }

    #[test]
    fn test_fuzzy_floor_discards_non_candidates() {
        let a = record("Dune", "Frank Herbert");
        let b = record("Storm Front", "Jim Butcher");

        assert_eq!(score_pair(&a, &b), None);
    }

    #[test]
    fn test_candidates_ordered_and_deterministic() {
        let canonical = vec![
            record("Storm Front", "Jim Butcher"),
            record("storm front", "Butcher, Jim"),
            record("Fool Moon", "Jim Butcher"),
        ];
        let incoming = record("The Storm Front", "Jim Butcher");

        let candidates = find_candidates(&incoming, &canonical);
        assert_eq!(candidates.len(), 2);
        // both exact matches score 0.90; insertion order breaks the tie
        assert_eq!(candidates[0].index, 0);
        assert_eq!(candidates[1].index, 1);
        assert_eq!(candidates[0].confidence, CONFIDENCE_TITLE_AUTHOR);
    }

    #[test]
    fn test_author_blank_on_both_sides_matches_exact() {
        let a = record("Gnomon", "");
        let mut b = Record::new().with_title("gnomon!");
        b.author = None;

        let (confidence, tier) = score_pair(&a, &b).unwrap();
        assert_eq!(tier, MatchTier::TitleAuthor);
        assert_eq!(confidence, CONFIDENCE_TITLE_AUTHOR);
    }
}
