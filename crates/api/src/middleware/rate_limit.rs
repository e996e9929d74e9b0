//! Fixed-window rate limiting backed by the key-value store.
//!
//! Each route method is wrapped with the policy for its [`RateClass`] via
//! [`limited`]. The counter is keyed by user id when the request carries a session cookie
//! whose signature verifies, otherwise by client IP. Forwarding headers only
//! name the client when `TRUST_PROXY_HEADERS` is on. When the store is
//! unreachable the request is let through.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use pura_core::rate_limit::{policy_for, RateClass};
use serde_json::json;

use crate::auth::cookie::SESSION_COOKIE;
use crate::auth::session::SessionService;
use crate::kv::KeyValueStore;
use crate::state::AppState;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

/// Middleware state: which policy applies and where counters live.
#[derive(Clone)]
pub struct RateLimit {
    class: RateClass,
    kv: Arc<dyn KeyValueStore>,
    sessions: SessionService,
    trust_proxy_headers: bool,
}

impl RateLimit {
    pub fn new(
        class: RateClass,
        kv: Arc<dyn KeyValueStore>,
        sessions: SessionService,
        trust_proxy_headers: bool,
    ) -> Self {
        Self {
            class,
            kv,
            sessions,
            trust_proxy_headers,
        }
    }

    pub fn for_state(state: &AppState, class: RateClass) -> Self {
        Self::new(
            class,
            Arc::clone(&state.kv),
            state.sessions.clone(),
            state.config.trust_proxy_headers,
        )
    }
}

/// Wrap `method_router` with the policy for `class`.
///
/// Applied per method so one path can mix classes, e.g. reads and deletes.
pub fn limited<S>(method_router: MethodRouter<S>, state: &AppState, class: RateClass) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    method_router.route_layer(middleware::from_fn_with_state(
        RateLimit::for_state(state, class),
        enforce,
    ))
}

/// Count the request and reject it once the window's ceiling is passed.
pub async fn enforce(State(limit): State<RateLimit>, req: Request, next: Next) -> Response {
    let policy = policy_for(limit.class);
    let identity = identify(&limit, &req);
    let now = unix_now();
    let key = policy.counter_key(&identity, now);

    match limit.kv.incr_with_ttl(&key, policy.window).await {
        Ok(count) if count > policy.max_requests => {
            tracing::info!(class = %limit.class, identity = %identity, count, "Rate limit exceeded");
            too_many_requests(policy.retry_after(now))
        }
        Ok(_) => next.run(req).await,
        Err(err) => {
            tracing::warn!(error = %err, class = %limit.class, "Rate limiter unavailable, allowing request");
            next.run(req).await
        }
    }
}

fn too_many_requests(retry_after_secs: u64) -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(RETRY_AFTER, retry_after_secs.to_string())],
        Json(json!({ "errors": RATE_LIMIT_MESSAGE })),
    )
        .into_response()
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Counter identity: `user:{id}` for a signed session, else `ip:{addr}`.
fn identify(limit: &RateLimit, req: &Request) -> String {
    let user_id = CookieJar::from_headers(req.headers())
        .get(SESSION_COOKIE)
        .and_then(|c| limit.sessions.peek_user_id(c.value()));
    if let Some(user_id) = user_id {
        return format!("user:{user_id}");
    }

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());
    format!(
        "ip:{}",
        client_ip(req.headers(), peer, limit.trust_proxy_headers)
    )
}

/// The socket peer, or with `trust_proxy_headers` the `X-Forwarded-For`
/// first hop, then `X-Real-IP`, then the peer.
fn client_ip(headers: &HeaderMap, peer: Option<String>, trust_proxy_headers: bool) -> String {
    if !trust_proxy_headers {
        return peer.unwrap_or_else(|| "unknown".to_string());
    }

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| header("x-real-ip").map(str::to_string))
        .or(peer)
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;
    use crate::auth::jwt::JwtConfig;
    use crate::kv::{InMemoryStore, StoreError};

    struct UnavailableStore;

    #[async_trait::async_trait]
    impl KeyValueStore for UnavailableStore {
        async fn get(&self, _: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn set_ex(&self, _: &str, _: &str, _: Duration) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn del(&self, _: &str) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn incr_with_ttl(&self, _: &str, _: Duration) -> Result<u64, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    fn sessions(kv: Arc<dyn KeyValueStore>) -> SessionService {
        SessionService::new(
            kv,
            JwtConfig {
                secret: "rate-limit-test".into(),
                session_ttl_hours: 24,
            },
        )
    }

    fn app(class: RateClass, kv: Arc<dyn KeyValueStore>) -> Router {
        app_with(class, kv, true)
    }

    fn app_with(class: RateClass, kv: Arc<dyn KeyValueStore>, trust_proxy_headers: bool) -> Router {
        let limit = RateLimit::new(class, Arc::clone(&kv), sessions(kv), trust_proxy_headers);
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(limit, enforce))
    }

    fn request(ip: &str) -> Request {
        Request::builder()
            .uri("/")
            .header("x-forwarded-for", format!("{ip}, 10.0.0.1"))
            .body(Body::empty())
            .unwrap()
    }

    /// A request from `peer` claiming to be forwarded for `forwarded_for`.
    fn request_from(peer: &str, forwarded_for: &str) -> Request {
        let mut req = request(forwarded_for);
        let addr: SocketAddr = format!("{peer}:40000").parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    #[tokio::test]
    async fn ceiling_is_enforced_per_identity() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        let app = app(RateClass::Auth, kv);
        let ceiling = policy_for(RateClass::Auth).max_requests;

        for _ in 0..ceiling {
            let res = app.clone().oneshot(request("203.0.113.7")).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }

        let res = app.clone().oneshot(request("203.0.113.7")).await.unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after: u64 = res.headers()[RETRY_AFTER].to_str().unwrap().parse().unwrap();
        assert!(retry_after >= 1 && retry_after <= 15 * 60);

        // Another client still has its own budget.
        let res = app.oneshot(request("198.51.100.2")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn rejection_body_is_fixed() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        let app = app(RateClass::Auth, kv);
        let mut last = None;
        for _ in 0..=policy_for(RateClass::Auth).max_requests {
            last = Some(app.clone().oneshot(request("192.0.2.1")).await.unwrap());
        }
        let body = http_body_util::BodyExt::collect(last.unwrap().into_body())
            .await
            .unwrap()
            .to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "errors": RATE_LIMIT_MESSAGE }));
    }

    #[tokio::test]
    async fn unavailable_store_allows_requests() {
        let app = app(RateClass::Auth, Arc::new(UnavailableStore));
        for _ in 0..20 {
            let res = app.clone().oneshot(request("192.0.2.9")).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn rotating_forwarded_for_does_not_reset_the_counter() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
        let app = app_with(RateClass::Auth, kv, false);
        let ceiling = policy_for(RateClass::Auth).max_requests;

        for n in 0..ceiling {
            let forged = format!("203.0.113.{n}");
            let res = app.clone().oneshot(request_from("192.0.2.50", &forged)).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK);
        }

        let res = app
            .clone()
            .oneshot(request_from("192.0.2.50", "198.51.100.99"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

        let res = app.oneshot(request_from("192.0.2.51", "198.51.100.99")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn client_ip_ignores_forwarding_headers_unless_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "198.51.100.5".parse().unwrap());
        headers.insert("x-forwarded-for", "203.0.113.1, 10.0.0.2".parse().unwrap());

        assert_eq!(client_ip(&headers, Some("127.0.0.1".into()), false), "127.0.0.1");
        assert_eq!(client_ip(&headers, None, false), "unknown");
    }

    #[test]
    fn client_ip_precedence_behind_trusted_proxy() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some("127.0.0.1".into()), true), "127.0.0.1");
        assert_eq!(client_ip(&headers, None, true), "unknown");

        headers.insert("x-real-ip", "198.51.100.5".parse().unwrap());
        assert_eq!(client_ip(&headers, Some("127.0.0.1".into()), true), "198.51.100.5");

        headers.insert("x-forwarded-for", "203.0.113.1, 10.0.0.2".parse().unwrap());
        assert_eq!(client_ip(&headers, None, true), "203.0.113.1");
    }
}
