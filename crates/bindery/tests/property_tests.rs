//! Property-based tests for Bindery's matching and merging core.
//!
//! These use proptest to generate adversarial inputs and verify that the
//! pipeline's invariants hold under all of them.
//!
//! # Testing Philosophy
//!
//! Property-based tests verify:
//! 1. **No panics**: normalizers and the matcher accept arbitrary text
//! 2. **Determinism**: same input always produces same output
//! 3. **Idempotence**: normalizing twice equals normalizing once; rerunning
//!    a batch changes nothing
//! 4. **Safety**: merging never loses protected data, and fuzzy similarity
//!    alone never clears the auto-merge gate
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p bindery --test property_tests
//!
//! # More cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p bindery --test property_tests
//! ```

use proptest::prelude::*;

use bindery::matching::FUZZY_FLOOR;
use bindery::normalize::{
    isbn10_to_isbn13, normalize_asin, normalize_isbn13, normalize_person_name, normalize_title,
};
use bindery::{
    generate_identity, merge, reconcile_batch, score_pair, IdentityTier, MatchTier, MergePolicy,
    ReconcileConfig, Record,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Arbitrary printable text, unicode included.
fn any_text() -> impl Strategy<Value = String> {
    ".{0,60}"
}

/// Text shaped like what actually appears in title and author cells.
fn name_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 .,'\\-]{0,40}"
}

/// Plausible titles, with and without leading articles.
fn title_like() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Z][a-z]{1,8}( [a-z]{1,8}){0,4}",
        "(The |A |An )[A-Z][a-z]{1,8}( [a-z]{1,8}){0,3}",
    ]
}

/// Plausible author names in the forms the ingest adapters produce.
fn person_like() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Z][a-z]{2,9} [A-Z][a-z]{2,11}",
        "[A-Z][a-z]{2,11}, [A-Z][a-z]{2,9}",
        "[A-Z]\\.[A-Z]\\. [A-Z][a-z]{2,11}",
    ]
}

/// Strings that look identifier-ish: some valid, most not.
fn isbn_like() -> impl Strategy<Value = String> {
    prop_oneof![
        "97[89][0-9]{10}",
        "[0-9]{10}",
        "978-[0-9]-[0-9]{4}-[0-9]{4}-[0-9]",
        "[A-Za-z0-9\\-]{0,20}",
    ]
}

fn book(title: &str, author: &str) -> Record {
    Record::new().with_title(title).with_author(author)
}

// =============================================================================
// Normalizer Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_normalizers_are_total(raw in any_text()) {
        // must not panic, whatever comes in
        let _ = normalize_title(&raw);
        let _ = normalize_person_name(&raw);
        let _ = normalize_isbn13(&raw);
        let _ = normalize_asin(&raw);
        let _ = isbn10_to_isbn13(&raw);
    }

    #[test]
    fn prop_normalize_title_idempotent(raw in name_text()) {
        let once = normalize_title(&raw);
        prop_assert_eq!(normalize_title(&once), once);
    }

    #[test]
    fn prop_normalize_person_name_idempotent(raw in name_text()) {
        let once = normalize_person_name(&raw);
        prop_assert_eq!(normalize_person_name(&once), once);
    }

    #[test]
    fn prop_valid_isbn_output_is_canonical(raw in isbn_like()) {
        if let Some(isbn) = normalize_isbn13(&raw) {
            prop_assert_eq!(isbn.len(), 13);
            prop_assert!(isbn.bytes().all(|b| b.is_ascii_digit()));
            // already-canonical input survives unchanged
            prop_assert_eq!(normalize_isbn13(&isbn), Some(isbn));
        }
    }

    #[test]
    fn prop_isbn10_conversion_always_validates(raw in isbn_like()) {
        if let Some(isbn13) = isbn10_to_isbn13(&raw) {
            prop_assert_eq!(normalize_isbn13(&isbn13), Some(isbn13));
        }
    }

    #[test]
    fn prop_valid_asin_output_is_canonical(raw in any_text()) {
        if let Some(asin) = normalize_asin(&raw) {
            prop_assert_eq!(asin.len(), 10);
            prop_assert_eq!(normalize_asin(&asin), Some(asin));
        }
    }
}

// =============================================================================
// Identity Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_identity_is_deterministic_and_prefixed(
        title in any_text(),
        author in any_text(),
    ) {
        let record = book(&title, &author);
        let first = generate_identity(&record);
        let second = generate_identity(&record);

        prop_assert_eq!(&first, &second);
        prop_assert!(IdentityTier::of(&first).is_some(), "unprefixed identity {first:?}");
    }

    #[test]
    fn prop_existing_identity_returned_verbatim(
        title in title_like(),
        id in "[a-z0-9:]{1,30}",
    ) {
        prop_assume!(!id.trim().is_empty());
        let mut record = book(&title, "Someone");
        record.work_id = Some(id.clone());

        prop_assert_eq!(generate_identity(&record), id);
    }

    #[test]
    fn prop_identity_ignores_case_and_spacing(
        title in title_like(),
        author in person_like(),
    ) {
        let plain = book(&title, &author);
        let shouty = book(&format!("  {}  ", title.to_uppercase()), &author);

        prop_assert_eq!(generate_identity(&plain), generate_identity(&shouty));
    }
}

// =============================================================================
// Matcher Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_score_is_symmetric(
        title_a in name_text(), author_a in name_text(), isbn_a in isbn_like(),
        title_b in name_text(), author_b in name_text(), isbn_b in isbn_like(),
    ) {
        let a = book(&title_a, &author_a).with_isbn13(isbn_a);
        let b = book(&title_b, &author_b).with_isbn13(isbn_b);

        prop_assert_eq!(score_pair(&a, &b), score_pair(&b, &a));
    }

    #[test]
    fn prop_score_bounded_and_floored(
        title_a in name_text(), author_a in name_text(),
        title_b in name_text(), author_b in name_text(),
    ) {
        let a = book(&title_a, &author_a);
        let b = book(&title_b, &author_b);

        if let Some((confidence, tier)) = score_pair(&a, &b) {
            prop_assert!((0.0..=1.0).contains(&confidence));
            if tier == MatchTier::Fuzzy {
                prop_assert!(confidence >= FUZZY_FLOOR);
            }
        }
    }

    #[test]
    fn prop_identifier_bearing_records_never_match_fuzzily(
        title_a in name_text(), author_a in name_text(),
        title_b in name_text(), author_b in name_text(),
    ) {
        let a = book(&title_a, &author_a).with_isbn13("9780441013593");
        let b = book(&title_b, &author_b);

        if let Some((_, tier)) = score_pair(&a, &b) {
            prop_assert_ne!(tier, MatchTier::Fuzzy);
        }
    }
}

// =============================================================================
// Merge Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_merge_never_replaces_protected_values(
        title in title_like(),
        existing_rating in "[0-5](\\.[05])?",
        incoming_rating in "[0-5](\\.[05])?",
        existing_notes in "[A-Za-z ]{1,30}",
    ) {
        let mut existing = book(&title, "Someone");
        existing.rating = Some(existing_rating.clone());
        existing.notes = Some(existing_notes.clone());

        let mut incoming = book(&title, "Someone");
        incoming.rating = Some(incoming_rating);
        incoming.notes = None;

        let outcome = merge(&existing, &incoming, &MergePolicy::default());
        prop_assert_eq!(outcome.record.rating, Some(existing_rating));
        prop_assert_eq!(outcome.record.notes, Some(existing_notes));
    }

    #[test]
    fn prop_merge_identity_always_from_existing(
        id_a in "[a-z0-9:]{0,20}",
        id_b in "[a-z0-9:]{1,20}",
    ) {
        let mut existing = book("Some Title", "Someone");
        existing.work_id = (!id_a.is_empty()).then(|| id_a.clone());
        let mut incoming = book("Some Title", "Someone");
        incoming.work_id = Some(id_b);

        let outcome = merge(&existing, &incoming, &MergePolicy::default());
        prop_assert_eq!(outcome.record.work_id, existing.work_id);
    }

    #[test]
    fn prop_merge_unions_are_supersets(
        existing_tags in prop::collection::btree_set("[a-z]{1,8}", 0..5),
        incoming_tags in prop::collection::btree_set("[a-z]{1,8}", 0..5),
    ) {
        let mut existing = book("Some Title", "Someone");
        existing.tags = existing_tags.clone();
        let mut incoming = book("Some Title", "Someone");
        incoming.tags = incoming_tags.clone();

        let outcome = merge(&existing, &incoming, &MergePolicy::default());
        prop_assert!(outcome.record.tags.is_superset(&existing_tags));
        prop_assert!(outcome.record.tags.is_superset(&incoming_tags));
    }

    #[test]
    fn prop_merge_with_self_is_noop(
        title in title_like(),
        author in person_like(),
        rating in "[0-5](\\.[05])?",
    ) {
        let mut record = book(&title, &author);
        record.rating = Some(rating);
        record.tags = ["fantasy".to_string()].into();

        let outcome = merge(&record, &record.clone(), &MergePolicy::default());
        prop_assert!(!outcome.changed);
        prop_assert!(outcome.notes.is_empty());
        prop_assert_eq!(outcome.record, record);
    }

    #[test]
    fn prop_remerge_changes_nothing(
        title in title_like(),
        publisher in "[A-Za-z ]{1,20}",
        pages in "[1-9][0-9]{1,3}",
    ) {
        let existing = book(&title, "Someone");
        let mut incoming = book(&title, "Someone");
        incoming.publisher = Some(publisher);
        incoming.pages = Some(pages);

        let first = merge(&existing, &incoming, &MergePolicy::default());
        let second = merge(&first.record, &incoming, &MergePolicy::default());

        prop_assert!(!second.changed);
        prop_assert_eq!(second.record, first.record);
    }
}

// =============================================================================
// Reconcile Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_fuzzy_similarity_never_clears_the_auto_gate(
        title_a in title_like(), author_a in person_like(),
        title_b in title_like(), author_b in person_like(),
    ) {
        let a = book(&title_a, &author_a);
        let b = book(&title_b, &author_b);
        let config = ReconcileConfig::default();

        let outcome = reconcile_batch(vec![a.clone()], vec![b.clone()], &config).unwrap();

        if outcome.report.stats.merged == 1 {
            let (confidence, tier) = score_pair(&a, &b).expect("merged pair must score");
            prop_assert!(
                tier != MatchTier::Fuzzy || confidence >= config.auto_merge_threshold,
                "fuzzy {confidence} merged below the gate"
            );
        }
    }

    #[test]
    fn prop_reconcile_is_deterministic(
        title_a in title_like(), author_a in person_like(),
        title_b in title_like(), author_b in person_like(),
    ) {
        let canonical = vec![book(&title_a, &author_a)];
        let batch = vec![book(&title_b, &author_b)];
        let config = ReconcileConfig::default();

        let first = reconcile_batch(canonical.clone(), batch.clone(), &config).unwrap();
        let second = reconcile_batch(canonical, batch, &config).unwrap();

        prop_assert_eq!(first.records, second.records);
        prop_assert_eq!(first.report.stats, second.report.stats);
    }

    #[test]
    fn prop_every_written_record_has_an_identity(
        titles in prop::collection::vec(title_like(), 1..6),
        author in person_like(),
    ) {
        let batch: Vec<Record> = titles.iter().map(|t| book(t, &author)).collect();

        let outcome = reconcile_batch(Vec::new(), batch, &ReconcileConfig::default()).unwrap();
        for record in &outcome.records {
            let id = record.work_id.as_deref().unwrap_or("");
            prop_assert!(IdentityTier::of(id).is_some(), "record without identity: {id:?}");
        }
    }
}
