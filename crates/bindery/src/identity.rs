//! Stable identity generation for canonical records.
//!
//! An identity is permanent once assigned. It is derived from the best
//! identifier the record carries and prefixed with its derivation tier so
//! consumers can reason about how trustworthy the identity itself is.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::normalize::{normalize_asin, normalize_isbn13, normalize_person_name, normalize_title};
use crate::record::Record;

/// How an identity token was derived, highest tier first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityTier {
    /// Derived from a valid ISBN-13.
    Isbn13,
    /// Derived from a store identifier.
    Asin,
    /// Derived from a hash of normalized title and author.
    Hash,
}

impl IdentityTier {
    /// The prefix this tier stamps onto identity tokens.
    pub fn prefix(&self) -> &'static str {
        match self {
            IdentityTier::Isbn13 => "isbn13:",
            IdentityTier::Asin => "asin:",
            IdentityTier::Hash => "hash:",
        }
    }

    /// Classify an existing identity token by its prefix.
    pub fn of(identity: &str) -> Option<IdentityTier> {
        [IdentityTier::Isbn13, IdentityTier::Asin, IdentityTier::Hash]
            .into_iter()
            .find(|tier| identity.starts_with(tier.prefix()))
    }
}

/// Derive the stable identity for a record.
///
/// An identity already present on the record is returned verbatim, never
/// regenerated. Otherwise the first available source wins: valid ISBN-13,
/// then valid ASIN, then a deterministic hash of the normalized title and
/// author. Callers invoke this once, at the moment a record is confirmed
/// new; a hash-derived identity is never upgraded later even if an
/// identifier becomes available.
pub fn generate_identity(record: &Record) -> String {
    if let Some(existing) = record.work_id.as_deref() {
        let existing = existing.trim();
        if !existing.is_empty() {
            return existing.to_string();
        }
    }

    if let Some(isbn) = record.isbn13.as_deref().and_then(normalize_isbn13) {
        return format!("{}{isbn}", IdentityTier::Isbn13.prefix());
    }

    if let Some(asin) = record.asin.as_deref().and_then(normalize_asin) {
        return format!("{}{asin}", IdentityTier::Asin.prefix());
    }

    let title = normalize_title(record.title.as_deref().unwrap_or(""));
    let author = normalize_person_name(record.author.as_deref().unwrap_or(""));
    let mut hasher = Sha256::new();
    hasher.update(format!("{title}|{author}").as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("{}{}", IdentityTier::Hash.prefix(), &digest[..16])
}
