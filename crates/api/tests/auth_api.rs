//! HTTP-level tests for login, current user and logout.

mod common;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use common::{
    body_json, delete, get, login, patch_json, post_json, seed_user,
    set_cookie_header, spawn_app, TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "../db/migrations")]
async fn login_sets_session_cookie_and_returns_user(pool: PgPool) {
    let user = seed_user(&pool, "admin@pura.test").await;
    let app = spawn_app(pool).router;

    let response = post_json(
        &app,
        "/api/users/_login",
        json!({ "email": "admin@pura.test", "password": TEST_PASSWORD }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let header = set_cookie_header(&response).unwrap();
    assert!(header.contains("HttpOnly"));
    assert!(header.contains("SameSite=None"));
    assert!(header.contains("Path=/"));
    assert!(header.contains("Max-Age=86400"));

    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], user.id);
    assert_eq!(json["data"]["email"], "admin@pura.test");
    assert!(json["data"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_current_logout_scenario(pool: PgPool) {
    seed_user(&pool, "admin@pura.test").await;
    let app = spawn_app(pool).router;

    let cookie = login(&app, "admin@pura.test", TEST_PASSWORD).await;

    let response = get(&app, "/api/users/_current", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["email"], "admin@pura.test");

    let response = post_json(&app, "/api/users/_logout", json!({}), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cleared = set_cookie_header(&response).unwrap();
    assert!(cleared.starts_with("access_token=;"));
    assert!(cleared.contains("Max-Age=0"));

    // The token still verifies, but its session entry is gone.
    let response = get(&app, "/api/users/_current", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_also_accepts_delete(pool: PgPool) {
    seed_user(&pool, "admin@pura.test").await;
    let app = spawn_app(pool).router;
    let cookie = login(&app, "admin@pura.test", TEST_PASSWORD).await;

    let response = delete(&app, "/api/users/_logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(&app, "/api/users/_current", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn each_login_is_an_independent_session(pool: PgPool) {
    seed_user(&pool, "admin@pura.test").await;
    let app = spawn_app(pool).router;

    let first = login(&app, "admin@pura.test", TEST_PASSWORD).await;
    let second = login(&app, "admin@pura.test", TEST_PASSWORD).await;
    assert_ne!(first, second);

    let response = post_json(&app, "/api/users/_logout", json!({}), Some(&first)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(&app, "/api/users/_current", Some(&second)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn wrong_password_and_unknown_email_look_the_same(pool: PgPool) {
    seed_user(&pool, "admin@pura.test").await;
    let app = spawn_app(pool).router;

    let wrong = post_json(
        &app,
        "/api/users/_login",
        json!({ "email": "admin@pura.test", "password": "not-the-password" }),
        None,
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie_header(&wrong).is_none());

    let unknown = post_json(
        &app,
        "/api/users/_login",
        json!({ "email": "nobody@pura.test", "password": TEST_PASSWORD }),
        None,
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(body_json(wrong).await, body_json(unknown).await);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn malformed_login_is_rejected(pool: PgPool) {
    let app = spawn_app(pool).router;

    let response = post_json(
        &app,
        "/api/users/_login",
        json!({ "email": "not-an-email", "password": "x" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["errors"].as_str().unwrap().contains("email"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_or_forged_cookie_is_unauthorized(pool: PgPool) {
    let app = spawn_app(pool).router;

    let response = get(&app, "/api/users/_current", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get(&app, "/api/users/_current", Some("access_token=forged.token.value")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["errors"], "Invalid or expired session");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_current_changes_name_and_password(pool: PgPool) {
    seed_user(&pool, "admin@pura.test").await;
    let app = spawn_app(pool).router;
    let cookie = login(&app, "admin@pura.test", TEST_PASSWORD).await;

    let response = patch_json(
        &app,
        "/api/users/_current",
        json!({ "name": "Ketut", "password": "a-new-password" }),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "Ketut");

    // The old password no longer works, the new one does.
    let response = post_json(
        &app,
        "/api/users/_login",
        json!({ "email": "admin@pura.test", "password": TEST_PASSWORD }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    login(&app, "admin@pura.test", "a-new-password").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_current_rejects_short_password(pool: PgPool) {
    seed_user(&pool, "admin@pura.test").await;
    let app = spawn_app(pool).router;
    let cookie = login(&app, "admin@pura.test", TEST_PASSWORD).await;

    let response = patch_json(
        &app,
        "/api/users/_current",
        json!({ "password": "short" }),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json(&app, "/api/users/_current", json!({}), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_attempts_are_rate_limited(pool: PgPool) {
    seed_user(&pool, "admin@pura.test").await;
    let app = spawn_app(pool).router;
    let body = json!({ "email": "admin@pura.test", "password": "guessing" });

    for _ in 0..10 {
        let response = post_json(&app, "/api/users/_login", body.clone(), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = post_json(&app, "/api/users/_login", body, None).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));
    assert_eq!(
        body_json(response).await,
        json!({ "errors": "Too many requests, please try again later." })
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn forged_forwarded_for_does_not_bypass_login_limit(pool: PgPool) {
    seed_user(&pool, "admin@pura.test").await;
    let app = spawn_app(pool).router;
    let body = serde_json::to_vec(&json!({ "email": "admin@pura.test", "password": "guessing" }))
        .unwrap();

    let attempt = |n: u32| {
        Request::builder()
            .method(Method::POST)
            .uri("/api/users/_login")
            .header(CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", format!("203.0.113.{n}"))
            .body(Body::from(body.clone()))
            .unwrap()
    };

    for n in 0..10 {
        let response = app.clone().oneshot(attempt(n)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = app.oneshot(attempt(10)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}
