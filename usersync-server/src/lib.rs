//! usersync-server: HTTP server for user records
//!
//! Accepts batches of nested user documents, upserts them as flat rows in a
//! PostgreSQL-compatible store, and serves them back as nested JSON.

pub mod db;
pub mod error;
pub mod http;
pub mod models;

pub use db::{create_pool, StoreConfig, TableName};
pub use error::{Error, Result};
pub use http::{AppState, ErrorStatusPolicy, ServerConfig};

/// Build the pool and run the HTTP server until shutdown.
///
/// With `create_table` set, the user table is created first if missing;
/// that step needs the store to be reachable at startup.
pub async fn serve(
    store: StoreConfig,
    table: TableName,
    config: ServerConfig,
    create_table: bool,
) -> Result<()> {
    let pool = create_pool(&store)?;

    if create_table {
        db::schema::create_table(&pool, &table).await?;
    }

    http::run_server(AppState::new(pool, table), config).await?;
    Ok(())
}
