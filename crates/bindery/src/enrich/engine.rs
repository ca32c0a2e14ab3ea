//! Enrichment pass over a collection.

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BinderyError, Result};
use crate::record::Record;

use super::provider::{FetchedMetadata, MetadataProvider};

/// Tuning for an enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// Pause before each outbound call, to stay polite to free APIs.
    pub delay: Duration,
    /// Stop after this many eligible records.
    pub limit: Option<usize>,
    /// Fill the genres field.
    pub fill_genres: bool,
    /// Fill the description field.
    pub fill_description: bool,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(500),
            limit: None,
            fill_genres: true,
            fill_description: true,
        }
    }
}

/// Counters from one enrichment run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichStats {
    /// Records in the collection.
    pub scanned: usize,
    /// Records with an ISBN and at least one empty target field.
    pub eligible: usize,
    /// Records that gained at least one field.
    pub enriched: usize,
    pub genres_added: usize,
    pub descriptions_added: usize,
    pub api_calls: usize,
    /// Lookups that failed; the run continues past them.
    pub errors: usize,
}

/// Fill empty genres/description fields from a metadata provider.
///
/// Only blank fields are written; populated ones are never touched, the
/// same rule merge applies to descriptive data. A fallback provider, when
/// given, is consulted per record for whatever the primary left unfilled.
/// Individual lookup failures are counted and skipped, so one bad ISBN or
/// a transient outage never sinks the batch.
pub fn enrich_records(
    records: &mut [Record],
    provider: &dyn MetadataProvider,
    fallback: Option<&dyn MetadataProvider>,
    config: &EnrichConfig,
) -> Result<EnrichStats> {
    if !config.fill_genres && !config.fill_description {
        return Err(BinderyError::Config(
            "enrichment needs at least one of genres or description enabled".to_string(),
        ));
    }

    let mut stats = EnrichStats {
        scanned: records.len(),
        ..EnrichStats::default()
    };

    for record in records.iter_mut() {
        let needs_genres = config.fill_genres && is_blank(record.genres.as_deref());
        let needs_description = config.fill_description && is_blank(record.description.as_deref());
        if !needs_genres && !needs_description {
            continue;
        }
        let Some(isbn13) = record.isbn13.as_deref().filter(|s| !s.trim().is_empty()) else {
            continue;
        };

        if config.limit.is_some_and(|limit| stats.eligible >= limit) {
            break;
        }
        stats.eligible += 1;

        let mut fetched = fetch_tolerant(provider, isbn13, config, &mut stats);

        if let Some(fallback) = fallback {
            let missing_genres =
                needs_genres && fetched.as_ref().map_or(true, |m| m.genres.is_empty());
            let missing_description =
                needs_description && fetched.as_ref().map_or(true, |m| m.description.is_none());

            if missing_genres || missing_description {
                if let Some(extra) = fetch_tolerant(fallback, isbn13, config, &mut stats) {
                    let merged = fetched.get_or_insert_with(FetchedMetadata::default);
                    if missing_genres && !extra.genres.is_empty() {
                        merged.genres = extra.genres;
                    }
                    if missing_description && extra.description.is_some() {
                        merged.description = extra.description;
                    }
                }
            }
        }

        let Some(metadata) = fetched else { continue };

        let mut changed = false;
        if needs_genres && !metadata.genres.is_empty() {
            record.genres = Some(metadata.genres.join("|"));
            stats.genres_added += 1;
            changed = true;
        }
        if needs_description {
            if let Some(description) = metadata.description {
                record.description = Some(description);
                stats.descriptions_added += 1;
                changed = true;
            }
        }
        if changed {
            stats.enriched += 1;
        }
    }

    Ok(stats)
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}

/// One provider call: pace, fetch, fold failures into the error count.
fn fetch_tolerant(
    provider: &dyn MetadataProvider,
    isbn13: &str,
    config: &EnrichConfig,
    stats: &mut EnrichStats,
) -> Option<FetchedMetadata> {
    if !config.delay.is_zero() {
        thread::sleep(config.delay);
    }
    stats.api_calls += 1;
    match provider.fetch(isbn13) {
        Ok(found) => found.filter(|metadata| !metadata.is_empty()),
        Err(_) => {
            stats.errors += 1;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::MockProvider;

    fn book(isbn13: Option<&str>) -> Record {
        let mut record = Record::default();
        record.title = Some("Dune".to_string());
        record.author = Some("Herbert, Frank".to_string());
        record.isbn13 = isbn13.map(str::to_string);
        record
    }

    fn sci_fi() -> FetchedMetadata {
        FetchedMetadata {
            genres: vec!["Science Fiction".to_string(), "Space Opera".to_string()],
            description: Some("Desert planet.".to_string()),
        }
    }

    fn fast() -> EnrichConfig {
        EnrichConfig {
            delay: Duration::ZERO,
            ..EnrichConfig::default()
        }
    }

    #[test]
    fn test_fills_only_empty_fields() {
        let mut records = vec![book(Some("9780441013593"))];
        records[0].description = Some("My own words.".to_string());

        let provider = MockProvider::new().with_book("9780441013593", sci_fi());
        let stats = enrich_records(&mut records, &provider, None, &fast()).unwrap();

        assert_eq!(
            records[0].genres.as_deref(),
            Some("Science Fiction|Space Opera")
        );
        assert_eq!(records[0].description.as_deref(), Some("My own words."));
        assert_eq!(stats.eligible, 1);
        assert_eq!(stats.genres_added, 1);
        assert_eq!(stats.descriptions_added, 0);
        assert_eq!(stats.enriched, 1);
        assert_eq!(stats.api_calls, 1);
    }

    #[test]
    fn test_skips_records_without_isbn_or_needs() {
        let mut full = book(Some("9780743273565"));
        full.genres = Some("Classics".to_string());
        full.description = Some("Already described.".to_string());
        let mut records = vec![book(None), full];

        let provider = MockProvider::new();
        let stats = enrich_records(&mut records, &provider, None, &fast()).unwrap();

        assert_eq!(stats.scanned, 2);
        assert_eq!(stats.eligible, 0);
        assert_eq!(stats.api_calls, 0);
        assert_eq!(stats.enriched, 0);
    }

    #[test]
    fn test_fallback_fills_what_primary_missed() {
        let mut records = vec![book(Some("9780441013593"))];

        let primary = MockProvider::new().with_book(
            "9780441013593",
            FetchedMetadata {
                genres: vec!["Science Fiction".to_string()],
                description: None,
            },
        );
        let fallback = MockProvider::new().with_book(
            "9780441013593",
            FetchedMetadata {
                genres: vec!["Overwritten If Broken".to_string()],
                description: Some("From the fallback.".to_string()),
            },
        );

        let stats = enrich_records(&mut records, &primary, Some(&fallback), &fast()).unwrap();

        // primary's genres survive; only the missing description came from
        // the fallback
        assert_eq!(records[0].genres.as_deref(), Some("Science Fiction"));
        assert_eq!(
            records[0].description.as_deref(),
            Some("From the fallback.")
        );
        assert_eq!(stats.api_calls, 2);
        assert_eq!(stats.genres_added, 1);
        assert_eq!(stats.descriptions_added, 1);
        assert_eq!(stats.enriched, 1);
    }

    #[test]
    fn test_fallback_not_consulted_when_primary_suffices() {
        let mut records = vec![book(Some("9780441013593"))];

        let primary = MockProvider::new().with_book("9780441013593", sci_fi());
        // would bump the error count if it were ever called
        let fallback = MockProvider::new().with_failure("9780441013593");

        let stats = enrich_records(&mut records, &primary, Some(&fallback), &fast()).unwrap();

        assert_eq!(stats.api_calls, 1);
        assert_eq!(stats.errors, 0);
        assert_eq!(stats.enriched, 1);
    }

    #[test]
    fn test_single_failure_does_not_sink_the_batch() {
        let mut records = vec![book(Some("9780743273565")), book(Some("9780441013593"))];

        let provider = MockProvider::new()
            .with_failure("9780743273565")
            .with_book("9780441013593", sci_fi());

        let stats = enrich_records(&mut records, &provider, None, &fast()).unwrap();

        assert_eq!(stats.errors, 1);
        assert_eq!(stats.enriched, 1);
        assert!(records[0].genres.is_none());
        assert_eq!(
            records[1].genres.as_deref(),
            Some("Science Fiction|Space Opera")
        );
    }

    #[test]
    fn test_limit_caps_eligible_records() {
        let isbns = ["9780441013593", "9780743273565", "9780316769488"];
        let mut records: Vec<Record> = isbns.iter().map(|isbn| book(Some(isbn))).collect();

        let mut provider = MockProvider::new();
        for isbn in isbns {
            provider = provider.with_book(isbn, sci_fi());
        }

        let config = EnrichConfig {
            limit: Some(2),
            ..fast()
        };
        let stats = enrich_records(&mut records, &provider, None, &config).unwrap();

        assert_eq!(stats.eligible, 2);
        assert_eq!(stats.enriched, 2);
        assert!(records[2].genres.is_none());
    }

    #[test]
    fn test_all_fields_disabled_is_a_config_error() {
        let mut records = vec![book(Some("9780441013593"))];
        let provider = MockProvider::new();

        let config = EnrichConfig {
            fill_genres: false,
            fill_description: false,
            ..fast()
        };
        let result = enrich_records(&mut records, &provider, None, &config);

        assert!(matches!(result, Err(BinderyError::Config(_))));
    }

    #[test]
    fn test_genres_only_mode_leaves_description_alone() {
        let mut records = vec![book(Some("9780441013593"))];
        let provider = MockProvider::new().with_book("9780441013593", sci_fi());

        let config = EnrichConfig {
            fill_description: false,
            ..fast()
        };
        let stats = enrich_records(&mut records, &provider, None, &config).unwrap();

        assert_eq!(
            records[0].genres.as_deref(),
            Some("Science Fiction|Space Opera")
        );
        assert!(records[0].description.is_none());
        assert_eq!(stats.descriptions_added, 0);
    }

    #[test]
    fn test_empty_response_counts_call_but_changes_nothing() {
        let mut records = vec![book(Some("9780441013593"))];
        let provider =
            MockProvider::new().with_book("9780441013593", FetchedMetadata::default());

        let stats = enrich_records(&mut records, &provider, None, &fast()).unwrap();

        assert_eq!(stats.api_calls, 1);
        assert_eq!(stats.eligible, 1);
        assert_eq!(stats.enriched, 0);
        assert!(records[0].genres.is_none());
    }
}
