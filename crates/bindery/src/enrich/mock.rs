//! Mock metadata provider for tests and offline runs.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{BinderyError, Result};

use super::provider::{FetchedMetadata, MetadataProvider};

/// Mock provider backed by canned responses.
///
/// Unknown ISBNs return `Ok(None)`, matching a live provider with no entry
/// for the book.
#[derive(Debug, Default)]
pub struct MockProvider {
    responses: BTreeMap<String, FetchedMetadata>,
    failures: BTreeSet<String>,
}

impl MockProvider {
    /// Create an empty mock provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canned response for an ISBN.
    pub fn with_book(mut self, isbn13: impl Into<String>, metadata: FetchedMetadata) -> Self {
        self.responses.insert(isbn13.into(), metadata);
        self
    }

    /// Make lookups of an ISBN fail, for error-path tests.
    pub fn with_failure(mut self, isbn13: impl Into<String>) -> Self {
        self.failures.insert(isbn13.into());
        self
    }
}

impl MetadataProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch(&self, isbn13: &str) -> Result<Option<FetchedMetadata>> {
        if self.failures.contains(isbn13) {
            return Err(BinderyError::Provider {
                provider: self.name().to_string(),
                message: format!("canned failure for {isbn13}"),
            });
        }
        Ok(self.responses.get(isbn13).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_responses() {
        let provider = MockProvider::new()
            .with_book(
                "9780441013593",
                FetchedMetadata {
                    genres: vec!["Science Fiction".to_string()],
                    description: Some("Desert planet.".to_string()),
                },
            )
            .with_failure("9780743273565");

        let found = provider.fetch("9780441013593").unwrap().unwrap();
        assert_eq!(found.genres, ["Science Fiction"]);

        assert!(provider.fetch("9780316769488").unwrap().is_none());
        assert!(provider.fetch("9780743273565").is_err());
    }
}
