#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use pura_api::auth::jwt::JwtConfig;
use pura_api::auth::password::hash_password;
use pura_api::config::ServerConfig;
use pura_api::kv::InMemoryStore;
use pura_api::router::build_app_router;
use pura_api::state::AppState;
use pura_api::storage::InMemoryObjectStore;
use pura_db::models::user::{CreateUser, User};
use pura_db::repositories::UserRepo;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse-battery";
pub const PUBLIC_URL: &str = "https://cdn.pura.test";

/// Build a test `ServerConfig`: plain-HTTP cookies, no CAPTCHA.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        cookie_secure: false,
        trust_proxy_headers: false,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            session_ttl_hours: 24,
        },
        captcha: None,
    }
}

/// The application plus handles on its in-memory collaborators.
pub struct TestApp {
    pub router: Router,
    pub objects: InMemoryObjectStore,
    pub kv: InMemoryStore,
}

/// Build the full application router over in-memory stores.
pub fn spawn_app(pool: PgPool) -> TestApp {
    let config = test_config();
    let kv = InMemoryStore::new();
    let objects = InMemoryObjectStore::new(PUBLIC_URL);
    let state = AppState::new(
        pool,
        config.clone(),
        Arc::new(kv.clone()),
        Arc::new(objects.clone()),
    );
    TestApp {
        router: build_app_router(state, &config),
        objects,
        kv,
    }
}

pub fn build_test_app(pool: PgPool) -> Router {
    spawn_app(pool).router
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, None, cookie).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value, cookie: Option<&str>) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), cookie).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value, cookie: Option<&str>) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body), cookie).await
}

pub async fn patch_json(app: &Router, uri: &str, body: Value, cookie: Option<&str>) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body), cookie).await
}

pub async fn delete(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    send(app, Method::DELETE, uri, None, cookie).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Insert a user whose password is [`TEST_PASSWORD`].
pub async fn seed_user(pool: &PgPool, email: &str) -> User {
    let input = CreateUser {
        name: "Test Admin".to_string(),
        email: email.to_string(),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
    };
    UserRepo::create(pool, &input).await.unwrap()
}

/// The raw `Set-Cookie` header for the session cookie, if any.
pub fn set_cookie_header(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("access_token="))
        .map(str::to_string)
}

/// `access_token=...` pair suitable for a `Cookie` request header.
pub fn cookie_pair(response: &Response<Body>) -> String {
    let header = set_cookie_header(response).expect("response should set the session cookie");
    header.split(';').next().unwrap().to_string()
}

/// Log in through the API and return the cookie pair.
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": password });
    let response = post_json(app, "/api/users/_login", body, None).await;
    assert_eq!(response.status(), 200, "login should succeed");
    cookie_pair(&response)
}

/// Seed a user and log in as them.
pub async fn admin_session(app: &Router, pool: &PgPool) -> String {
    seed_user(pool, "admin@pura.test").await;
    login(app, "admin@pura.test", TEST_PASSWORD).await
}
