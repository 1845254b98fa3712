//! Repository implementations for database access
//!
//! Repositories follow these patterns:
//! - Handle conflicts via ON CONFLICT (no check-then-insert)
//! - Acquire one pooled connection per operation

pub mod users;

pub use users::{StoreError, UpsertError, UserRepo};
