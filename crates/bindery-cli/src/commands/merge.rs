//! Merge command - reconcile source exports into the collection.

use std::path::PathBuf;

use bindery::{
    ingest, load_collection, reconcile_batch, save_collection, save_report, ReconcileConfig,
    Record,
};
use colored::Colorize;

#[allow(clippy::too_many_arguments)]
pub fn run(
    collection: PathBuf,
    goodreads: Vec<PathBuf>,
    kindle: Vec<PathBuf>,
    shelf_text: Vec<PathBuf>,
    incoming: Vec<PathBuf>,
    init: bool,
    report: Option<PathBuf>,
    verbose: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    if goodreads.is_empty() && kindle.is_empty() && shelf_text.is_empty() && incoming.is_empty() {
        return Err(
            "no input files given; pass --goodreads, --kindle, --shelf-text, or --incoming".into(),
        );
    }

    let canonical = if collection.exists() {
        let records = load_collection(&collection)?;
        println!(
            "Loaded {} records from {}",
            records.len(),
            collection.display()
        );
        records
    } else if init {
        println!(
            "{} Starting a new collection at {}",
            "Note:".yellow(),
            collection.display()
        );
        Vec::new()
    } else {
        return Err(format!(
            "Collection not found: {}. Pass --init to start a new one.",
            collection.display()
        )
        .into());
    };

    let mut batch: Vec<Record> = Vec::new();
    for path in &goodreads {
        let records = ingest::load_goodreads_export(path)?;
        println!(
            "Loaded {} records from Goodreads export {}",
            records.len(),
            path.display()
        );
        batch.extend(records);
    }
    for path in &kindle {
        let records = ingest::load_kindle_export(path)?;
        println!(
            "Loaded {} records from Kindle export {}",
            records.len(),
            path.display()
        );
        batch.extend(records);
    }
    for path in &shelf_text {
        let records = ingest::load_shelf_inventory(path)?;
        println!(
            "Loaded {} records from shelf inventory {}",
            records.len(),
            path.display()
        );
        batch.extend(records);
    }
    for path in &incoming {
        let records = load_collection(path)?;
        println!("Loaded {} records from {}", records.len(), path.display());
        batch.extend(records);
    }

    let outcome = reconcile_batch(canonical, batch, &ReconcileConfig::default())?;
    let stats = outcome.report.stats;

    save_collection(&collection, &outcome.records)?;
    let report_path = report.unwrap_or_else(|| collection.with_extension("report.json"));
    save_report(&report_path, &outcome.report)?;

    println!();
    println!("{}", "Reconciliation complete".cyan().bold());
    println!("  Merged:    {}", stats.merged.to_string().green());
    println!("  Ambiguous: {}", stats.ambiguous.to_string().yellow());
    println!("  Added:     {}", stats.added.to_string().white());
    println!("  Skipped:   {}", stats.skipped.to_string().red());
    println!();

    if verbose {
        for merge in &outcome.report.merges {
            println!(
                "  merged {:.2} [{}] {} <- {}",
                merge.confidence, merge.tier, merge.existing.title, merge.incoming.title
            );
        }
        for warning in &outcome.report.warnings {
            println!("  skipped record #{}: {}", warning.position, warning.reason);
        }
        if !outcome.report.merges.is_empty() || !outcome.report.warnings.is_empty() {
            println!();
        }
    }

    if !outcome.report.discrepancies.is_empty() {
        println!(
            "{} {} ambiguous matches need review:",
            "Warning:".yellow().bold(),
            outcome.report.discrepancies.len()
        );
        for entry in &outcome.report.discrepancies {
            println!(
                "  {:.2} {} ({}) vs {} ({})",
                entry.confidence,
                entry.existing.title,
                entry.existing.author,
                entry.incoming.title,
                entry.incoming.author
            );
        }
        println!();
    }

    println!(
        "Collection now has {} records: {}",
        stats.canonical_total.to_string().white().bold(),
        collection.display()
    );
    println!(
        "Report written to {}",
        report_path.display().to_string().cyan()
    );

    Ok(0)
}
