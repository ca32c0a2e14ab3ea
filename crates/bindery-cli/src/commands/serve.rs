//! Serve command - run the read-only query API.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use bindery::load_collection;
use colored::Colorize;

use crate::server::{app, state::AppState};

pub fn run(
    collection: PathBuf,
    port: u16,
    host: String,
    verbose: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let records = load_collection(&collection)?;
    let ip: IpAddr = host
        .parse()
        .map_err(|_| format!("Invalid host address: {}", host))?;
    let addr = SocketAddr::new(ip, port);

    if verbose {
        println!(
            "Loaded {} records from {}",
            records.len(),
            collection.display()
        );
    }

    let state = AppState::new(records);

    println!();
    println!(
        "{} {}",
        "Serving the collection at".cyan().bold(),
        format!("http://{}/api", addr).white().bold()
    );
    println!();
    println!("  Collection: {}", collection.display());
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        tokio::spawn(async {
            tokio::signal::ctrl_c().await.ok();
            println!();
            println!("{}", "Shutting down...".yellow());
            std::process::exit(0);
        });

        app::run_server(state, addr).await
    })?;

    Ok(0)
}
