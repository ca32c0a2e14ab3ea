//! Google Books metadata provider.
//!
//! Used as a fallback for ISBNs Open Library does not know. The volumes
//! endpoint answers a missing ISBN with an empty item list rather than a
//! 404, so "not found" falls out of payload parsing.

use std::collections::BTreeSet;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::{BinderyError, Result};

use super::provider::{clean_description, FetchedMetadata, MetadataProvider, USER_AGENT};

/// Default Google Books endpoint.
const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// Categories too generic to mean anything as genres.
const GENERIC_CATEGORIES: &[&str] = &["general", "fiction", "nonfiction"];

/// Google Books volume lookup.
pub struct GoogleBooksProvider {
    client: Client,
    base_url: String,
}

impl GoogleBooksProvider {
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

impl MetadataProvider for GoogleBooksProvider {
    fn name(&self) -> &str {
        "googlebooks"
    }

    fn fetch(&self, isbn13: &str) -> Result<Option<FetchedMetadata>> {
        let url = format!("{}/books/v1/volumes", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", format!("isbn:{isbn13}"))])
            .send()?;

        if !response.status().is_success() {
            return Err(BinderyError::Provider {
                provider: self.name().to_string(),
                message: format!("HTTP {} for {url}", response.status()),
            });
        }

        let payload: Value = response.json()?;
        Ok(parse_volumes(&payload))
    }
}

/// Pull genres and description out of the first matched volume.
fn parse_volumes(payload: &Value) -> Option<FetchedMetadata> {
    let info = payload
        .get("items")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|item| item.get("volumeInfo"))?;

    let mut categories = BTreeSet::new();
    if let Some(values) = info.get("categories").and_then(Value::as_array) {
        for category in values.iter().filter_map(Value::as_str) {
            let category = category.trim();
            if category.is_empty() || GENERIC_CATEGORIES.contains(&category.to_lowercase().as_str())
            {
                continue;
            }
            categories.insert(category.to_string());
        }
    }

    let description = info
        .get("description")
        .and_then(Value::as_str)
        .and_then(clean_description);

    Some(FetchedMetadata {
        genres: categories.into_iter().collect(),
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_volumes_first_item() {
        let payload = json!({
            "totalItems": 2,
            "items": [
                {
                    "volumeInfo": {
                        "categories": ["Fiction", "Science Fiction / Space Opera"],
                        "description": "The <b>spice</b> must flow."
                    }
                },
                {
                    "volumeInfo": { "description": "A later edition." }
                }
            ]
        });
        let metadata = parse_volumes(&payload).unwrap();

        assert_eq!(metadata.genres, ["Science Fiction / Space Opera"]);
        assert_eq!(metadata.description.as_deref(), Some("The spice must flow."));
    }

    #[test]
    fn test_parse_volumes_no_items() {
        assert_eq!(parse_volumes(&json!({ "totalItems": 0 })), None);
        assert_eq!(parse_volumes(&json!({ "items": [] })), None);
    }

    #[test]
    fn test_parse_volumes_generic_categories_dropped() {
        let payload = json!({
            "items": [
                { "volumeInfo": { "categories": ["General", "FICTION"] } }
            ]
        });
        let metadata = parse_volumes(&payload).unwrap();

        assert!(metadata.is_empty());
    }
}
