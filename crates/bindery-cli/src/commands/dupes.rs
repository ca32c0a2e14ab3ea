//! Dupes command - list likely duplicate pairs for review.

use std::path::PathBuf;

use bindery::{find_duplicates, load_collection, save_report, DuplicateReport};
use colored::Colorize;

pub fn run(
    collection: PathBuf,
    json: Option<PathBuf>,
    threshold: f64,
    verbose: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let records = load_collection(&collection)?;
    let pairs = find_duplicates(&records, threshold);
    let report = DuplicateReport::new(records.len(), pairs);

    if let Some(path) = json {
        save_report(&path, &report)?;
        println!(
            "Scanned {} records, found {} likely duplicate pairs.",
            report.scanned,
            report.pairs.len()
        );
        println!("Report written to {}", path.display().to_string().cyan());
        return Ok(0);
    }

    if report.pairs.is_empty() {
        println!(
            "{} No likely duplicates at or above {:.2}.",
            "OK".green().bold(),
            threshold
        );
        return Ok(0);
    }

    println!(
        "Scanned {} records, found {} likely duplicate pairs:",
        report.scanned,
        report.pairs.len().to_string().yellow().bold()
    );
    println!();
    for pair in &report.pairs {
        println!(
            "  {} [{}] {} ({}) vs {} ({})",
            format!("{:.2}", pair.confidence).cyan().bold(),
            pair.tier,
            pair.left.title,
            pair.left.author,
            pair.right.title,
            pair.right.author
        );
        if verbose {
            println!(
                "       {} vs {}",
                display_identity(&pair.left.identity),
                display_identity(&pair.right.identity)
            );
        }
    }

    Ok(0)
}

fn display_identity(identity: &str) -> &str {
    if identity.is_empty() {
        "(unassigned)"
    } else {
        identity
    }
}
