//! Route definitions for the `/users` resource.

use axum::routing::{get, patch, post};
use axum::Router;
use pura_core::rate_limit::RateClass;

use crate::handlers::users;
use crate::middleware::rate_limit::limited;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST          /_login     -> login (auth class)
/// GET           /_current   -> current
/// PATCH         /_current   -> update_current
/// POST, DELETE  /_logout    -> logout
/// ```
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/_login", limited(post(users::login), state, RateClass::Auth))
        .route(
            "/_current",
            limited(get(users::current), state, RateClass::CmsRead)
                .merge(limited(patch(users::update_current), state, RateClass::CmsWrite)),
        )
        .route(
            "/_logout",
            limited(
                post(users::logout).delete(users::logout),
                state,
                RateClass::CmsWrite,
            ),
        )
}
