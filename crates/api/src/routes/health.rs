use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when every dependency answers, `degraded` otherwise.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether the key-value store (sessions, rate limits) is reachable.
    pub kv_healthy: bool,
}

/// GET /health -- service, database and key-value store health.
///
/// Answers 503 when a dependency is down so load balancers can act on the
/// status alone.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = pura_db::health_check(&state.pool).await.is_ok();
    let kv_healthy = match state.kv.ping().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Key-value store health check failed");
            false
        }
    };

    let (status, code) = if db_healthy && kv_healthy {
        ("ok", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            db_healthy,
            kv_healthy,
        }),
    )
}

/// Mount health check routes (root level, not under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
