//! Table bootstrap for the user store
//!
//! The table is normally provisioned by the host. This creates it when
//! asked to (tests, `serve --create-table`) and is a no-op if it exists.
//! `id` is spelled INT4 because CockroachDB reads INTEGER as INT8.

use sqlx::PgPool;

use super::TableName;

/// Create the user table if it does not exist yet.
pub async fn create_table(pool: &PgPool, table: &TableName) -> Result<(), sqlx::Error> {
    tracing::info!(%table, "Ensuring user table exists");

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INT4 PRIMARY KEY,
            name TEXT NOT NULL,
            username TEXT NOT NULL,
            email TEXT NOT NULL,
            street TEXT NOT NULL,
            suite TEXT NOT NULL,
            city TEXT NOT NULL,
            zipcode TEXT NOT NULL,
            lat TEXT NOT NULL,
            lng TEXT NOT NULL,
            phone TEXT NOT NULL,
            website TEXT NOT NULL,
            company_name TEXT NOT NULL,
            company_catchPhrase TEXT NOT NULL,
            company_bs TEXT NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}
