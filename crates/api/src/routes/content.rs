//! Routers for the flat content types, generic over the entity.
//!
//! ```text
//! ADMIN (auth):
//! GET    /        list        cms-read
//! POST   /        create      cms-write
//! GET    /{id}    get_by_id   cms-read
//! PUT    /{id}    update      cms-write
//! DELETE /{id}    delete      delete
//!
//! PUBLIC:
//! GET    /        list_public public-read
//! GET    /{id}    get_public  public-read
//! ```

use axum::routing::{delete, get, post, put};
use axum::Router;
use pura_core::rate_limit::RateClass;
use pura_db::models::content::ContentEntity;

use crate::handlers::content;
use crate::middleware::rate_limit::limited;
use crate::state::AppState;

/// Admin routes for `E`, mounted at `/{resource}`.
pub fn admin_router<E: ContentEntity>(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            limited(get(content::list::<E>), state, RateClass::CmsRead)
                .merge(limited(post(content::create::<E>), state, RateClass::CmsWrite)),
        )
        .route(
            "/{id}",
            limited(get(content::get_by_id::<E>), state, RateClass::CmsRead)
                .merge(limited(put(content::update::<E>), state, RateClass::CmsWrite))
                .merge(limited(delete(content::delete::<E>), state, RateClass::Delete)),
        )
}

/// Read-only routes for `E`, mounted at `/public/{resource}`.
pub fn public_router<E: ContentEntity>(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            limited(get(content::list_public::<E>), state, RateClass::PublicRead),
        )
        .route(
            "/{id}",
            limited(get(content::get_public::<E>), state, RateClass::PublicRead),
        )
}
