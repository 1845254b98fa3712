//! API error types with IntoResponse
//!
//! Every failure becomes a `{"error": "..."}` JSON body. Store details are
//! logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::repos::{StoreError, UpsertError};
use crate::models::MalformedRecord;

pub const NO_CONNECTION: &str = "No database connection available.";
pub const SAVE_FAILED: &str = "Failed to save message.";
pub const RETRIEVE_FAILED: &str = "Failed to retrieve users.";

/// Marks a response as produced by [`ApiError`].
///
/// The error-status middleware uses this to tell error bodies apart from
/// other responses.
#[derive(Debug, Clone, Copy)]
pub struct ErrorResponse;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Payload or record could not be decoded (400)
    Malformed(MalformedRecord),

    /// Store unreachable (503)
    ConnectionUnavailable,

    /// Store rejected an upsert (500, logged)
    SaveFailed,

    /// Store rejected a read (500, logged)
    RetrieveFailed,
}

impl ApiError {
    /// Map a failed batch upsert.
    pub fn from_upsert(e: UpsertError) -> Self {
        match e {
            UpsertError::Malformed(e) => Self::from(e),
            UpsertError::Store(StoreError::ConnectionUnavailable(e)) => {
                tracing::error!("No database connection available: {}", e);
                Self::ConnectionUnavailable
            }
            UpsertError::Store(StoreError::Persistence(e)) => {
                tracing::error!("Error saving users to database: {}", e);
                Self::SaveFailed
            }
        }
    }

    /// Map a failed read of all users.
    pub fn from_query(e: StoreError) -> Self {
        match e {
            StoreError::ConnectionUnavailable(e) => {
                tracing::error!("No database connection available: {}", e);
                Self::ConnectionUnavailable
            }
            StoreError::Persistence(e) => {
                tracing::error!("Error retrieving users from database: {}", e);
                Self::RetrieveFailed
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Malformed(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": SAVE_FAILED,
                    "detail": e.to_string()
                }),
            ),
            Self::ConnectionUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": NO_CONNECTION }))
            }
            Self::SaveFailed => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": SAVE_FAILED })),
            Self::RetrieveFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": RETRIEVE_FAILED }),
            ),
        };

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(ErrorResponse);
        response
    }
}

impl From<MalformedRecord> for ApiError {
    fn from(e: MalformedRecord) -> Self {
        tracing::warn!("Rejected users payload: {}", e);
        Self::Malformed(e)
    }
}
