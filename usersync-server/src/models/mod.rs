//! Domain models for user records
//!
//! Incoming documents are checked as they are decoded.
//! Invalid input returns MalformedRecord, not panic.

pub mod error;
pub mod record;

pub use error::MalformedRecord;
pub use record::{decode, encode, parse_batch, Address, Company, Geo, UserDocument, UserRow};
