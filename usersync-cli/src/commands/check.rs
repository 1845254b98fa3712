//! Check command - test database reachability once

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use usersync_server::db::{create_pool, ping};
use usersync_server::StoreConfig;

use super::require_database_url;

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Database URL
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Seconds to wait for a connection
    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,
}

/// Connect once and run a trivial query
pub async fn run_check(args: CheckArgs) -> Result<()> {
    let database_url = require_database_url(args.database_url)?;

    let store = StoreConfig {
        max_connections: 1,
        acquire_timeout: Duration::from_secs(args.timeout_secs),
        ..StoreConfig::new(database_url)
    };
    let pool = create_pool(&store).context("Invalid database URL")?;

    ping(&pool).await.context("Database is not reachable")?;

    tracing::info!("Database reachable");
    println!("database: ok");
    Ok(())
}
