//! usersync CLI - HTTP front end for a PostgreSQL user table
//!
//! This is the entry point for the `usersync` binary, which provides:
//! - `serve`: run the HTTP server (`/health`, `/saveUsers`, `/getUsers`)
//! - `check`: report whether the store is reachable

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "usersync",
    author,
    version,
    about = "Bulk user upserts and nested JSON queries over PostgreSQL",
    long_about = "Accept batches of nested user documents over HTTP, upsert them as flat rows \
                  keyed by id, and serve them back as nested JSON."
)]
struct Cli {
    /// Enable debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::serve::ServeArgs),
    /// Check that the database is reachable
    Check(commands::check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables take precedence
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_setup::init(cli.debug).ok();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Check(args) => commands::run_check(args).await?,
    }
    Ok(())
}
