//! User endpoints
//!
//! `POST /saveUsers` takes the raw body so that bad JSON is reported in the
//! same `{"error": ...}` shape as every other failure.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{parse_batch, UserDocument};

pub const SAVED: &str = "Messages saved successfully!";

/// Save response
#[derive(Serialize)]
pub struct SaveResponse {
    pub response: &'static str,
}

/// POST /saveUsers - upsert a JSON array of users
async fn save_users(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SaveResponse>, ApiError> {
    tracing::info!("Received a saveUsers request");

    let documents = parse_batch(&body)?;
    let saved = state
        .users()
        .upsert_documents(&documents)
        .await
        .map_err(ApiError::from_upsert)?;

    tracing::info!(saved, "Users saved");
    Ok(Json(SaveResponse { response: SAVED }))
}

/// GET /getUsers - every stored user as a nested document
async fn get_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserDocument>>, ApiError> {
    tracing::info!("Received a getUsers request");

    let users = state.users().list().await.map_err(ApiError::from_query)?;

    tracing::debug!(count = users.len(), "Users retrieved");
    Ok(Json(users))
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/saveUsers", post(save_users))
        .route("/getUsers", get(get_users))
}
