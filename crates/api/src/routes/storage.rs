//! Route definitions for the `/storage` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, post};
use axum::Router;
use pura_core::image_variants::MAX_UPLOAD_BYTES;
use pura_core::rate_limit::RateClass;

use crate::handlers::storage;
use crate::middleware::rate_limit::limited;
use crate::state::AppState;

/// Room for multipart framing on top of the image itself.
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 2 * 1024 * 1024;

/// Routes mounted at `/storage`.
///
/// ```text
/// POST   /upload   -> upload          (storage class)
/// DELETE /         -> delete_objects  (delete class)
/// ```
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            limited(post(storage::upload), state, RateClass::Storage)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/",
            limited(delete(storage::delete_objects), state, RateClass::Delete),
        )
}
