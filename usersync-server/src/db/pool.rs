//! Database connection pool management
//!
//! Uses sqlx PgPool with explicit connection limits. Connections are opened
//! lazily, so the server starts (and `/health` answers) while the store is
//! still unreachable.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Default maximum connections for the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default time a request waits for a pooled connection.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Store connection settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// How long an acquire waits before the store counts as unavailable
    pub acquire_timeout: Duration,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

/// Create a PostgreSQL connection pool.
///
/// No connection is opened here; each request acquires one and hands it back
/// when done.
///
/// # Errors
///
/// Returns an error if the connection string cannot be parsed.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&StoreConfig::new("postgres://localhost/usersync"))?;
/// ```
pub fn create_pool(config: &StoreConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_lazy(&config.database_url)
}

/// Check that the store answers a trivial query.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
