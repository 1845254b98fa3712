//! HTTP server command
//!
//! Runs the usersync HTTP server against the configured user table.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use usersync_server::db::pool::{DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_MAX_CONNECTIONS};
use usersync_server::{ErrorStatusPolicy, ServerConfig, StoreConfig, TableName};

use super::require_database_url;

/// Status codes used for error bodies
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStatus {
    /// 400/500/503 depending on the failure
    Http,
    /// Always 200; failures only show in the `error` field
    AlwaysOk,
}

impl From<ErrorStatus> for ErrorStatusPolicy {
    fn from(status: ErrorStatus) -> Self {
        match status {
            ErrorStatus::Http => Self::Http,
            ErrorStatus::AlwaysOk => Self::AlwaysOk,
        }
    }
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "USERSYNC_BIND", default_value = "127.0.0.1:3030")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, env = "USERSYNC_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,

    /// Seconds a request waits for a database connection
    #[arg(long, env = "USERSYNC_ACQUIRE_TIMEOUT_SECS", default_value_t = DEFAULT_ACQUIRE_TIMEOUT.as_secs())]
    pub acquire_timeout_secs: u64,

    /// Table holding user rows
    #[arg(long, env = "USERSYNC_TABLE", default_value = "users")]
    pub table: TableName,

    /// Mount routes under this prefix (e.g. /api)
    #[arg(long, env = "USERSYNC_BASE_PATH")]
    pub base_path: Option<String>,

    /// Status codes used for error bodies
    #[arg(long, env = "USERSYNC_ERROR_STATUS", value_enum, default_value_t = ErrorStatus::Http)]
    pub error_status: ErrorStatus,

    /// Create the user table on startup if it does not exist
    #[arg(long)]
    pub create_table: bool,
}

impl ServeArgs {
    fn store_config(&self, database_url: String) -> StoreConfig {
        StoreConfig {
            database_url,
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.acquire_timeout_secs),
        }
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind,
            cors_permissive: self.cors_permissive,
            base_path: self.base_path.clone(),
            error_status: self.error_status.into(),
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let database_url = require_database_url(args.database_url.clone())?;

    tracing::info!("Starting usersync server on {}", args.bind);

    let store = args.store_config(database_url);
    let config = args.server_config();

    // Run server (blocks until shutdown)
    usersync_server::serve(store, args.table, config, args.create_table)
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        serve: ServeArgs,
    }

    fn parse(args: &[&str]) -> ServeArgs {
        let argv = std::iter::once("usersync").chain(args.iter().copied());
        Harness::parse_from(argv).serve
    }

    #[test]
    fn builds_configs_from_flags() {
        let args = parse(&[
            "--bind",
            "0.0.0.0:8080",
            "--max-connections",
            "12",
            "--acquire-timeout-secs",
            "2",
            "--table",
            "customers",
            "--base-path",
            "/api",
            "--error-status",
            "always-ok",
        ]);

        let store = args.store_config("postgres://localhost/usersync".into());
        assert_eq!(store.max_connections, 12);
        assert_eq!(store.acquire_timeout, Duration::from_secs(2));

        let config = args.server_config();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.base_path.as_deref(), Some("/api"));
        assert_eq!(config.error_status, ErrorStatusPolicy::AlwaysOk);
        assert_eq!(args.table.as_str(), "customers");
    }

    #[test]
    fn rejects_unsafe_table_name() {
        let result = Harness::try_parse_from(["usersync", "--table", "users; DROP TABLE users"]);
        assert!(result.is_err());
    }
}
