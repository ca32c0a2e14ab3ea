//! Bindery CLI - book-collection reconciliation tool.

mod cli;
mod commands;
mod server;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Merge {
            collection,
            goodreads,
            kindle,
            shelf_text,
            incoming,
            init,
            report,
        } => commands::merge::run(
            collection,
            goodreads,
            kindle,
            shelf_text,
            incoming,
            init,
            report,
            cli.verbose,
        ),

        Commands::Dupes {
            collection,
            json,
            threshold,
        } => commands::dupes::run(collection, json, threshold, cli.verbose),

        Commands::Validate { collection, json } => {
            commands::validate::run(collection, json, cli.verbose)
        }

        Commands::Enrich {
            collection,
            provider,
            limit,
            delay_ms,
            dry_run,
        } => commands::enrich::run(collection, provider, limit, delay_ms, dry_run, cli.verbose),

        Commands::Resort { collection } => commands::resort::run(collection, cli.verbose),

        Commands::Serve {
            collection,
            port,
            host,
        } => commands::serve::run(collection, port, host, cli.verbose),
    };

    match result {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(2);
        }
    }
}
