//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, spawn_app};
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn health_check_reports_dependencies(pool: PgPool) {
    let app = spawn_app(pool).router;
    let response = get(&app, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["kv_healthy"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn responses_carry_a_request_id(pool: PgPool) {
    let app = spawn_app(pool).router;
    let response = get(&app, "/health", None).await;

    assert!(response.headers().contains_key("x-request-id"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let app = spawn_app(pool).router;
    let response = get(&app, "/this-route-does-not-exist", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
