//! Metadata enrichment from public book APIs.
//!
//! Fills empty descriptive fields (genres, description) by ISBN lookup.
//! Enrichment is strictly additive: a field someone already filled in by
//! hand is never overwritten, and a failed lookup never aborts the batch.
//!
//! # Providers
//!
//! - **Open Library** - primary source, free, no API key
//! - **Google Books** - optional fallback for ISBNs Open Library lacks
//! - **Mock** - canned responses for tests and offline runs

mod engine;
mod googlebooks;
mod mock;
mod openlibrary;
mod provider;

pub use engine::{enrich_records, EnrichConfig, EnrichStats};
pub use googlebooks::GoogleBooksProvider;
pub use mock::MockProvider;
pub use openlibrary::OpenLibraryProvider;
pub use provider::{FetchedMetadata, MetadataProvider};
