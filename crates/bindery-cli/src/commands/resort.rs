//! Resort command - rewrite a collection in canonical sort order.

use std::path::PathBuf;

use bindery::{load_collection, save_collection};
use colored::Colorize;

pub fn run(collection: PathBuf, _verbose: bool) -> Result<i32, Box<dyn std::error::Error>> {
    let records = load_collection(&collection)?;

    // Same key the store sorts by on save.
    let keys: Vec<(String, String)> = records
        .iter()
        .map(|r| {
            (
                r.display_author().to_lowercase(),
                r.display_title().to_lowercase(),
            )
        })
        .collect();
    let mut sorted_keys = keys.clone();
    sorted_keys.sort();

    if keys == sorted_keys {
        println!(
            "{} {} is already sorted.",
            "OK".green().bold(),
            collection.display()
        );
        return Ok(0);
    }

    save_collection(&collection, &records)?;
    println!(
        "Re-sorted {} records by author, then title: {}",
        records.len(),
        collection.display()
    );

    Ok(0)
}
