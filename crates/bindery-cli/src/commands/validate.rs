//! Validate command - check a collection without changing it.

use std::path::PathBuf;

use bindery::{load_collection, validate_collection, Severity, ValidationIssue};
use colored::{ColoredString, Colorize};

pub fn run(
    collection: PathBuf,
    json: bool,
    _verbose: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let records = load_collection(&collection)?;
    let report = validate_collection(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(if report.is_ok() { 0 } else { 1 });
    }

    println!(
        "{} {} records from {}",
        "Validated".cyan().bold(),
        report.checked,
        collection.display()
    );
    println!();

    if report.issues.is_empty() {
        println!("{}", "No problems found.".green().bold());
        return Ok(0);
    }

    print_section("Errors:", report.issues_at(Severity::Error), |line| {
        line.red()
    });
    print_section("Warnings:", report.issues_at(Severity::Warning), |line| {
        line.yellow()
    });
    print_section("Info:", report.issues_at(Severity::Info), |line| {
        line.blue()
    });

    println!(
        "{} errors, {} warnings, {} info.",
        report.error_count().to_string().red(),
        report.warning_count().to_string().yellow(),
        report.info_count().to_string().blue()
    );

    Ok(if report.is_ok() { 0 } else { 1 })
}

fn print_section<'a>(
    header: &str,
    issues: impl Iterator<Item = &'a ValidationIssue>,
    paint: impl Fn(&str) -> ColoredString,
) {
    let issues: Vec<_> = issues.collect();
    if issues.is_empty() {
        return;
    }

    println!("{}", header.bold());
    for issue in issues {
        let context = issue
            .record
            .as_ref()
            .map(|r| format!(" - {} ({})", r.title, r.author))
            .unwrap_or_default();
        println!(
            "  {}{}",
            paint(&format!("[{}] {}", issue.field, issue.message)),
            context
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_one_on_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.csv");
        std::fs::write(
            &path,
            "title,author,rating,read_status\nDune,\"Herbert, Frank\",9.5,finished\n",
        )
        .unwrap();

        let code = run(path, false, false).unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn test_exit_code_zero_when_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.csv");
        std::fs::write(
            &path,
            "title,author,rating,read_status\nDune,\"Herbert, Frank\",4.5,read\n",
        )
        .unwrap();

        let code = run(path, false, false).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_json_output_keeps_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.csv");
        std::fs::write(&path, "title,author\n,\"Herbert, Frank\"\n").unwrap();

        let code = run(path, true, false).unwrap();
        assert_eq!(code, 1);
    }
}
