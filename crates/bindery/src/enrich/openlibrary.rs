//! Open Library metadata provider.
//!
//! Editions are fetched by ISBN from the public JSON endpoint. No API key
//! is needed, but the service expects a User-Agent and polite pacing (the
//! enrichment engine handles the delay).

use std::collections::BTreeSet;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{BinderyError, Result};

use super::provider::{clean_description, FetchedMetadata, MetadataProvider, USER_AGENT};

/// Default Open Library endpoint.
const DEFAULT_BASE_URL: &str = "https://openlibrary.org";

/// Subjects too generic to mean anything as genres.
const GENERIC_SUBJECTS: &[&str] = &[
    "accessible book",
    "protected daisy",
    "fiction",
    "nonfiction",
];

/// Most genres kept from one subject list.
const MAX_GENRES: usize = 5;

/// Open Library edition lookup.
pub struct OpenLibraryProvider {
    client: Client,
    base_url: String,
}

impl OpenLibraryProvider {
    /// Create a provider against the public endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create against a non-default endpoint (mirrors, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BinderyError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl MetadataProvider for OpenLibraryProvider {
    fn name(&self) -> &str {
        "openlibrary"
    }

    fn fetch(&self, isbn13: &str) -> Result<Option<FetchedMetadata>> {
        let url = format!("{}/isbn/{isbn13}.json", self.base_url);
        let response = self.client.get(&url).send()?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(BinderyError::Provider {
                provider: self.name().to_string(),
                message: format!("HTTP {} for {url}", response.status()),
            });
        }

        let payload: Value = response.json()?;
        Ok(Some(parse_edition(&payload)))
    }
}

/// Pull genres and description out of an edition record.
///
/// Subjects become genres after dropping generic terms; duplicates collapse
/// and the first few alphabetical survivors are kept. Descriptions arrive
/// either as a bare string or as `{"value": "..."}`.
fn parse_edition(payload: &Value) -> FetchedMetadata {
    let mut subjects = BTreeSet::new();
    if let Some(values) = payload.get("subjects").and_then(Value::as_array) {
        for subject in values.iter().filter_map(Value::as_str) {
            let subject = subject.trim();
            if subject.is_empty() || GENERIC_SUBJECTS.contains(&subject.to_lowercase().as_str()) {
                continue;
            }
            subjects.insert(subject.to_string());
        }
    }
    let genres: Vec<String> = subjects.into_iter().take(MAX_GENRES).collect();

    let description = payload
        .get("description")
        .and_then(|d| d.as_str().or_else(|| d.get("value").and_then(Value::as_str)))
        .and_then(clean_description);

    FetchedMetadata {
        genres,
        description,
    }
}
