//! Health check endpoint
//!
//! Never touches the store.

use axum::{routing::get, Json, Router};
use serde::Serialize;

pub const ALIVE: &str = "I'm alive!";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub response: &'static str,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    tracing::info!("Received a health request");
    Json(HealthResponse { response: ALIVE })
}

/// Health routes
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
