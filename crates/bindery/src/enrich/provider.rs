//! Metadata provider trait and shared response cleanup.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// User-Agent sent with every outbound lookup. Open Library asks clients to
/// identify themselves.
pub(crate) const USER_AGENT: &str = "bindery/0.1 (personal library management)";

/// Longest description kept, in characters.
const MAX_DESCRIPTION_CHARS: usize = 5000;

/// Descriptive metadata fetched for a single ISBN.
///
/// Providers hand this back already cleaned: genres filtered and capped,
/// description stripped of markup and length-limited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchedMetadata {
    pub genres: Vec<String>,
    pub description: Option<String>,
}

impl FetchedMetadata {
    /// True when the lookup found nothing usable.
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty() && self.description.is_none()
    }
}

/// Trait for metadata lookup services.
///
/// Implementations must be thread-safe (Send + Sync). `fetch` returns
/// `Ok(None)` when the service has no entry for the ISBN; errors are
/// reserved for transport failures and unusable responses.
pub trait MetadataProvider: Send + Sync {
    /// Name of this provider (for stats and summaries).
    fn name(&self) -> &str;

    /// Look up descriptive metadata by normalized ISBN-13.
    fn fetch(&self, isbn13: &str) -> Result<Option<FetchedMetadata>>;
}

/// Clean an API-sourced description: strip HTML tags, trim, and cap overly
/// long text at a sentence boundary. Blank results become `None`.
pub(crate) fn clean_description(raw: &str) -> Option<String> {
    let tags = Regex::new(r"<[^>]+>").unwrap();
    let stripped = tags.replace_all(raw, "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(clamp_description(trimmed))
}

/// Cut a description down near the length limit, ending at the last full
/// sentence inside it.
fn clamp_description(text: &str) -> String {
    if text.chars().count() <= MAX_DESCRIPTION_CHARS {
        return text.to_string();
    }
    let prefix: String = text.chars().take(MAX_DESCRIPTION_CHARS).collect();
    match prefix.rsplit_once('.') {
        Some((head, _)) => format!("{head}."),
        None => prefix,
    }
}
