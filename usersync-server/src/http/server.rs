//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Error-status policy middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::map_response_with_state;
use axum::response::Response;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::error::ErrorResponse;
use super::routes;
use crate::db::repos::UserRepo;
use crate::db::TableName;

/// How error responses report failure at the transport level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorStatusPolicy {
    /// 400 / 500 / 503 depending on the failure
    #[default]
    Http,

    /// 200 for every response; the failure is only visible in the body
    AlwaysOk,
}

impl fmt::Display for ErrorStatusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::AlwaysOk => f.write_str("always-ok"),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,

    /// Prefix to mount the routes under (default: none, routes at `/`)
    pub base_path: Option<String>,

    /// Status codes for error bodies
    pub error_status: ErrorStatusPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
            base_path: None,
            error_status: ErrorStatusPolicy::Http,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Table holding user rows
    pub table: TableName,
}

impl AppState {
    pub fn new(pool: PgPool, table: TableName) -> Self {
        Self { pool, table }
    }

    pub fn users(&self) -> UserRepo<'_> {
        UserRepo::new(&self.pool, &self.table)
    }
}

/// Assemble the router with all routes and middleware.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        // Localhost only
        CorsLayer::new()
            .allow_origin([
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://localhost:3030"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
                HeaderValue::from_static("http://127.0.0.1:3030"),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let api = Router::new()
        .merge(routes::health::router())
        .merge(routes::users::router());

    let app = match normalize_base_path(config.base_path.as_deref()) {
        Some(prefix) => Router::new().nest(&prefix, api),
        None => api,
    };

    app.layer(map_response_with_state(config.error_status, apply_error_status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&StoreConfig::new(database_url))?;
/// let state = AppState::new(pool, TableName::default());
/// run_server(state, ServerConfig::default()).await?;
/// ```
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    tracing::info!(
        table = %state.table,
        error_status = %config.error_status,
        base_path = config.base_path.as_deref().unwrap_or("/"),
        "Server config loaded"
    );

    let app = build_router(state, &config);

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn apply_error_status(
    State(policy): State<ErrorStatusPolicy>,
    mut response: Response,
) -> Response {
    if policy == ErrorStatusPolicy::AlwaysOk && response.extensions().get::<ErrorResponse>().is_some() {
        *response.status_mut() = StatusCode::OK;
    }
    response
}

/// `"/api/"` -> `Some("/api")`, `"/"` or empty -> `None`
fn normalize_base_path(path: Option<&str>) -> Option<String> {
    let trimmed = path?.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{}", trimmed))
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    fn offline_state() -> AppState {
        // Nothing listens on port 1
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(250))
            .connect_lazy("postgres://usersync@127.0.0.1:1/usersync")
            .expect("pool creation failed");
        AppState::new(pool, TableName::default())
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 3030);
        assert!(!config.cors_permissive);
        assert!(config.base_path.is_none());
        assert_eq!(config.error_status, ErrorStatusPolicy::Http);
    }

    #[test]
    fn base_path_normalization() {
        assert_eq!(normalize_base_path(None), None);
        assert_eq!(normalize_base_path(Some("/")), None);
        assert_eq!(normalize_base_path(Some("")), None);
        assert_eq!(normalize_base_path(Some("api")), Some("/api".into()));
        assert_eq!(normalize_base_path(Some("/api/v1/")), Some("/api/v1".into()));
    }

    #[tokio::test]
    async fn health_answers_without_store() {
        let app = build_router(offline_state(), &ServerConfig::default());
        let (status, body) = call(app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "response": "I'm alive!" }));
    }

    #[tokio::test]
    async fn get_users_without_store_reports_no_connection() {
        let app = build_router(offline_state(), &ServerConfig::default());
        let (status, body) = call(app, get("/getUsers")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({ "error": "No database connection available." }));
    }

    #[tokio::test]
    async fn save_users_without_store_reports_no_connection() {
        let app = build_router(offline_state(), &ServerConfig::default());
        let (status, body) = call(app, post("/saveUsers", "[]")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({ "error": "No database connection available." }));
    }

    #[tokio::test]
    async fn save_users_checks_connection_before_decoding_records() {
        // The array envelope is fine; the record itself is not
        let app = build_router(offline_state(), &ServerConfig::default());
        let (status, body) = call(app, post("/saveUsers", r#"[{"id": "1"}]"#)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({ "error": "No database connection available." }));
    }

    #[tokio::test]
    async fn save_users_rejects_bare_object() {
        let app = build_router(offline_state(), &ServerConfig::default());
        let (status, body) = call(app, post("/saveUsers", r#"{"id": 1}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Failed to save message.");
        assert_eq!(
            body["detail"],
            "payload must be a JSON array of users, found an object"
        );
    }

    #[tokio::test]
    async fn save_users_rejects_invalid_json() {
        let app = build_router(offline_state(), &ServerConfig::default());
        let (status, body) = call(app, post("/saveUsers", "[{")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Failed to save message.");
    }

    #[tokio::test]
    async fn always_ok_policy_keeps_error_body() {
        let config = ServerConfig {
            error_status: ErrorStatusPolicy::AlwaysOk,
            ..ServerConfig::default()
        };
        let app = build_router(offline_state(), &config);
        let (status, body) = call(app, get("/getUsers")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "error": "No database connection available." }));
    }

    #[tokio::test]
    async fn always_ok_policy_leaves_unknown_routes_alone() {
        let config = ServerConfig {
            error_status: ErrorStatusPolicy::AlwaysOk,
            ..ServerConfig::default()
        };
        let app = build_router(offline_state(), &config);
        let (status, _) = call(app, get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn base_path_nests_routes() {
        let config = ServerConfig {
            base_path: Some("/api/".into()),
            ..ServerConfig::default()
        };
        let app = build_router(offline_state(), &config);

        let (status, body) = call(app.clone(), get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "I'm alive!");

        let (status, _) = call(app, get("/health")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn wrong_method_is_rejected() {
        let app = build_router(offline_state(), &ServerConfig::default());
        let (status, _) = call(app, get("/saveUsers")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    // Integration test - run with DATABASE_URL set

    #[tokio::test]
    #[ignore = "requires database"]
    async fn saved_users_round_trip_over_http() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = PgPoolOptions::new().connect(&url).await.expect("connect failed");
        let table = TableName::new(&format!("users_http_{}", uuid::Uuid::new_v4().simple()))
            .expect("valid table name");
        crate::db::schema::create_table(&pool, &table)
            .await
            .expect("create table failed");

        let app = build_router(AppState::new(pool.clone(), table.clone()), &ServerConfig::default());

        let (status, body) = call(app.clone(), get("/getUsers")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let user = json!({
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "x@y.com",
            "address": {
                "street": "Kulas Light",
                "suite": "Apt. 556",
                "city": "Gwenborough",
                "zipcode": "92998-3874",
                "geo": { "lat": "-37.3159", "lng": "81.1496" }
            },
            "phone": "1-770-736-8031",
            "website": "hildegard.org",
            "company": { "name": "Romaguera-Crona", "catchPhrase": "...", "bs": "..." }
        });
        let payload = json!([user]).to_string();

        let (status, body) = call(app.clone(), post("/saveUsers", &payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "response": "Messages saved successfully!" }));

        let (status, body) = call(app, get("/getUsers")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([user]));

        sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
            .execute(&pool)
            .await
            .expect("drop table failed");
    }
}
