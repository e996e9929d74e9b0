//! Cookie-session authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use pura_core::error::CoreError;
use pura_core::types::DbId;

use crate::auth::cookie::SESSION_COOKIE;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user resolved from the `access_token` cookie.
///
/// The token must verify and its session index entry must still exist;
/// otherwise the request is rejected with 401 before the handler runs.
/// Nothing is loaded from the database.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    /// Token id of the session, needed to revoke it on logout.
    pub token_id: String,
}

/// Raw session token from the request cookies, if any.
pub fn session_token(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Missing session cookie".into()))
        })?;

        let session = state.sessions.validate_token(&token).await?;

        Ok(AuthUser {
            user_id: session.user_id,
            token_id: session.token_id,
        })
    }
}
