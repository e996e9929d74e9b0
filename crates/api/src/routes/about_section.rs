//! Route definitions for `/about-sections`. Same surface and rate classes
//! as the flat content types.

use axum::routing::{delete, get, post, put};
use axum::Router;
use pura_core::rate_limit::RateClass;

use crate::handlers::about_section;
use crate::middleware::rate_limit::limited;
use crate::state::AppState;

pub fn admin_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            limited(get(about_section::list), state, RateClass::CmsRead)
                .merge(limited(post(about_section::create), state, RateClass::CmsWrite)),
        )
        .route(
            "/{id}",
            limited(get(about_section::get_by_id), state, RateClass::CmsRead)
                .merge(limited(put(about_section::update), state, RateClass::CmsWrite))
                .merge(limited(delete(about_section::delete), state, RateClass::Delete)),
        )
}

pub fn public_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            limited(get(about_section::list_public), state, RateClass::PublicRead),
        )
        .route(
            "/{id}",
            limited(get(about_section::get_public), state, RateClass::PublicRead),
        )
}
