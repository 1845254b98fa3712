//! Database layer - connection pool and repositories
//!
//! # Design Principles
//!
//! - Connection pool, one connection acquired per request
//! - Rely on ON CONFLICT for upserts - no check-then-insert
//! - No transactions: each record is its own statement

pub mod pool;
pub mod repos;
pub mod schema;
pub mod table;

pub use pool::{create_pool, ping, StoreConfig};
pub use repos::*;
pub use table::{InvalidTableName, TableName};
