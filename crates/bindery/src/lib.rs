//! Bindery: entity resolution and safe merging for personal book collections.
//!
//! A collection accretes records from everywhere: Goodreads exports, Kindle
//! library dumps, text transcribed from shelf photos. Bindery reconciles each
//! incoming record against a canonical CSV collection, deciding whether it is
//! already known (merge), probably known (keep both, flag for review), or new
//! (insert) - without ever silently losing data that was entered by hand.
//!
//! # Core Principles
//!
//! - **Identity outranks similarity**: verified identifiers (ISBN-13, ASIN)
//!   decide matches before any fuzzy string comparison gets a vote
//! - **Non-destructive**: merges only fill blanks; conflicting values are
//!   kept on the existing record and annotated, never overwritten
//! - **Deterministic**: the same canonical set and batch always produce the
//!   same collection, so reruns are safe
//!
//! # Example
//!
//! ```no_run
//! use bindery::{load_collection, reconcile_batch, save_collection, ReconcileConfig};
//!
//! let canonical = load_collection("books.csv").unwrap();
//! let incoming = bindery::ingest::load_goodreads_export("goodreads_export.csv").unwrap();
//!
//! let outcome = reconcile_batch(canonical, incoming, &ReconcileConfig::default()).unwrap();
//! println!(
//!     "merged {}, new {}",
//!     outcome.report.stats.merged, outcome.report.stats.added
//! );
//! save_collection("books.csv", &outcome.records).unwrap();
//! ```

pub mod dupes;
pub mod enrich;
pub mod error;
pub mod identity;
pub mod ingest;
pub mod matching;
pub mod merge;
pub mod normalize;
pub mod reconcile;
pub mod record;
pub mod store;
pub mod validate;

pub use dupes::{find_duplicates, DuplicatePair, DuplicateReport};
pub use error::{BinderyError, Result};
pub use identity::{generate_identity, IdentityTier};
pub use matching::{find_candidates, score_pair, MatchCandidate, MatchTier};
pub use merge::{merge, MergeNote, MergeOutcome, MergePolicy};
pub use reconcile::{
    reconcile_batch, DiscrepancyEntry, ReconcileConfig, ReconcileOutcome, ReconcileReport,
    RecordState,
};
pub use record::Record;
pub use store::{load_collection, save_collection, save_report};
pub use validate::{validate_collection, Severity, ValidationIssue, ValidationReport};
