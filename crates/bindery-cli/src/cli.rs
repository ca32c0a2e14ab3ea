//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bindery: reconcile book records from multiple sources into one collection
#[derive(Parser)]
#[command(name = "bindery")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile source exports into the canonical collection
    Merge {
        /// Path to the collection CSV
        #[arg(value_name = "COLLECTION")]
        collection: PathBuf,

        /// Goodreads library export (CSV); repeatable
        #[arg(long, value_name = "FILE")]
        goodreads: Vec<PathBuf>,

        /// Kindle library export (CSV or JSON); repeatable
        #[arg(long, value_name = "FILE")]
        kindle: Vec<PathBuf>,

        /// Free-text shelf inventory (one book per line); repeatable
        #[arg(long = "shelf-text", value_name = "FILE")]
        shelf_text: Vec<PathBuf>,

        /// Already-canonical CSV to merge in; repeatable
        #[arg(long, value_name = "FILE")]
        incoming: Vec<PathBuf>,

        /// Start a new collection if COLLECTION does not exist
        #[arg(long)]
        init: bool,

        /// Output path for the discrepancy report (default: <collection>.report.json)
        #[arg(short, long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// List likely duplicate pairs in a collection
    Dupes {
        /// Path to the collection CSV
        #[arg(value_name = "COLLECTION")]
        collection: PathBuf,

        /// Write the report as JSON to this file instead of listing to stdout
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,

        /// Minimum confidence to report
        #[arg(long, default_value = "0.80")]
        threshold: f64,
    },

    /// Check a collection for format and vocabulary problems
    Validate {
        /// Path to the collection CSV
        #[arg(value_name = "COLLECTION")]
        collection: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fill missing genres and descriptions from metadata providers
    Enrich {
        /// Path to the collection CSV
        #[arg(value_name = "COLLECTION")]
        collection: PathBuf,

        /// Metadata provider to query first
        #[arg(long, default_value = "openlibrary")]
        provider: ProviderChoice,

        /// Enrich at most this many records
        #[arg(long)]
        limit: Option<usize>,

        /// Delay between HTTP calls in milliseconds
        #[arg(long, default_value = "500")]
        delay_ms: u64,

        /// Fetch and report without writing the collection
        #[arg(long)]
        dry_run: bool,
    },

    /// Rewrite a collection in canonical sort order
    Resort {
        /// Path to the collection CSV
        #[arg(value_name = "COLLECTION")]
        collection: PathBuf,
    },

    /// Serve the read-only query API over HTTP
    Serve {
        /// Path to the collection CSV
        #[arg(value_name = "COLLECTION")]
        collection: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "3141")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

/// Metadata provider choice for enrichment.
#[derive(Clone, Debug, Default)]
pub enum ProviderChoice {
    /// Open Library editions API.
    #[default]
    OpenLibrary,
    /// Google Books volumes API.
    GoogleBooks,
    /// Mock provider for testing (returns nothing).
    Mock,
}

impl std::str::FromStr for ProviderChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openlibrary" | "open-library" | "ol" => Ok(ProviderChoice::OpenLibrary),
            "googlebooks" | "google-books" | "google" => Ok(ProviderChoice::GoogleBooks),
            "mock" | "test" => Ok(ProviderChoice::Mock),
            _ => Err(format!(
                "Unknown provider: {}. Use: openlibrary, googlebooks, or mock.",
                s
            )),
        }
    }
}

impl std::fmt::Display for ProviderChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderChoice::OpenLibrary => write!(f, "openlibrary"),
            ProviderChoice::GoogleBooks => write!(f, "googlebooks"),
            ProviderChoice::Mock => write!(f, "mock"),
        }
    }
}
