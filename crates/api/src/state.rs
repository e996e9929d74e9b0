use std::sync::Arc;

use crate::auth::session::SessionService;
use crate::config::ServerConfig;
use crate::kv::KeyValueStore;
use crate::storage::ObjectStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc` or is itself a handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: pura_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Key-value store backing the session index and rate-limit counters.
    pub kv: Arc<dyn KeyValueStore>,
    /// Object store receiving uploaded image variants.
    pub objects: Arc<dyn ObjectStore>,
    pub sessions: SessionService,
    /// Outbound HTTP client (CAPTCHA verification).
    pub http: reqwest::Client,
}

impl AppState {
    /// Assemble state from its collaborators. The session service shares the
    /// key-value store.
    pub fn new(
        pool: pura_db::DbPool,
        config: ServerConfig,
        kv: Arc<dyn KeyValueStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        let sessions = SessionService::new(Arc::clone(&kv), config.jwt.clone());
        Self {
            pool,
            config: Arc::new(config),
            kv,
            objects,
            sessions,
            http: reqwest::Client::new(),
        }
    }
}
