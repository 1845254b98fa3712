//! Error types for usersync-server

use thiserror::Error;

use crate::http::ServerError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),
}
