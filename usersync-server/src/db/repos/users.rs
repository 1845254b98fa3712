//! User repository
//!
//! - upsert: one `INSERT ... ON CONFLICT (id) DO UPDATE` per record, in order
//! - list: one `SELECT` over the whole table, rows encoded back to documents
//!
//! Each call acquires a single pooled connection and releases it on return.
//! There is no enclosing transaction, so records written before a failure in
//! the same batch stay committed.

use serde_json::Value;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};

use crate::db::TableName;
use crate::models::{decode, encode, MalformedRecord, UserDocument, UserRow};

/// Store failure, split by whether the store could be reached at all
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no database connection available: {0}")]
    ConnectionUnavailable(#[source] sqlx::Error),

    #[error("database error: {0}")]
    Persistence(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::ConnectionUnavailable(e),
            _ => Self::Persistence(e),
        }
    }
}

/// Outcome of a failed batch upsert
#[derive(Debug, thiserror::Error)]
pub enum UpsertError {
    #[error("malformed record: {0}")]
    Malformed(#[from] MalformedRecord),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
    table: &'a TableName,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool, table: &'a TableName) -> Self {
        Self { pool, table }
    }

    /// Decode and upsert each document in order, stopping at the first failure.
    ///
    /// Returns the number of records written. Later occurrences of an id
    /// overwrite earlier ones.
    pub async fn upsert_documents(&self, documents: &[Value]) -> Result<usize, UpsertError> {
        let mut conn = self.acquire().await?;
        let sql = upsert_sql(self.table);

        for (index, document) in documents.iter().enumerate() {
            let row = decode(document).map_err(|e| e.at_index(index))?;

            bind_row(sqlx::query(&sql), &row)
                .execute(&mut *conn)
                .await
                .map_err(StoreError::from)?;

            tracing::debug!(id = row.id, index, "user upserted");
        }

        Ok(documents.len())
    }

    /// Read every row, in whatever order the store returns them.
    pub async fn list(&self) -> Result<Vec<UserDocument>, StoreError> {
        let mut conn = self.acquire().await?;

        let rows: Vec<UserRow> = sqlx::query_as(&select_sql(self.table))
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows.into_iter().map(encode).collect())
    }

    /// Any failure to hand out a connection means the store is unreachable.
    async fn acquire(&self) -> Result<PoolConnection<Postgres>, StoreError> {
        self.pool
            .acquire()
            .await
            .map_err(StoreError::ConnectionUnavailable)
    }
}

fn bind_row<'q>(
    query: Query<'q, Postgres, PgArguments>,
    row: &'q UserRow,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.username)
        .bind(&row.email)
        .bind(&row.street)
        .bind(&row.suite)
        .bind(&row.city)
        .bind(&row.zipcode)
        .bind(&row.lat)
        .bind(&row.lng)
        .bind(&row.phone)
        .bind(&row.website)
        .bind(&row.company_name)
        .bind(&row.company_catch_phrase)
        .bind(&row.company_bs)
}

fn upsert_sql(table: &TableName) -> String {
    format!(
        r#"
        INSERT INTO {table} (
            id, name, username, email, street, suite, city, zipcode,
            lat, lng, phone, website, company_name, company_catchPhrase, company_bs
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            username = EXCLUDED.username,
            email = EXCLUDED.email,
            street = EXCLUDED.street,
            suite = EXCLUDED.suite,
            city = EXCLUDED.city,
            zipcode = EXCLUDED.zipcode,
            lat = EXCLUDED.lat,
            lng = EXCLUDED.lng,
            phone = EXCLUDED.phone,
            website = EXCLUDED.website,
            company_name = EXCLUDED.company_name,
            company_catchPhrase = EXCLUDED.company_catchPhrase,
            company_bs = EXCLUDED.company_bs
        "#
    )
}

// Unquoted identifiers fold to lower case in Postgres, so camelCase columns
// are aliased to the field names UserRow expects. CockroachDB's INTEGER is
// 64-bit; decode only admits ids in i32 range, so the cast cannot overflow.
fn select_sql(table: &TableName) -> String {
    format!(
        r#"
        SELECT
            id::INT4 AS id, name, username, email, street, suite, city, zipcode,
            lat, lng, phone, website,
            company_name,
            company_catchPhrase AS company_catch_phrase,
            company_bs
        FROM {table}
        "#
    )
}
