//! Handlers for the `/users` resource (login, current user, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use pura_core::error::CoreError;
use pura_db::models::user::{UpdateUser, UserResponse};
use pura_db::repositories::UserRepo;
use serde::Deserialize;
use tokio::task;
use validator::Validate;

use crate::auth::captcha::verify_captcha;
use crate::auth::cookie::{expired_session_cookie, session_cookie};
use crate::auth::password::{hash_password, verify_password, PASSWORD_MIN_LENGTH};
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users/_login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
    /// Required only when CAPTCHA verification is configured.
    pub captcha_token: Option<String>,
}

/// Request body for `PATCH /users/_current`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCurrentUserRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,
    pub password: Option<String>,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/users/_login
///
/// Verify credentials, issue a session token and set it as the
/// `access_token` cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<DataResponse<UserResponse>>)> {
    if let Some(captcha) = &state.config.captcha {
        let token = input
            .captcha_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::BadRequest("captcha_token is required".into()))?;
        let solved = verify_captcha(&state.http, captcha, token, None)
            .await
            .map_err(|e| AppError::InternalError(format!("CAPTCHA provider error: {e}")))?;
        if !solved {
            return Err(AppError::BadRequest("CAPTCHA verification failed".into()));
        }
    }

    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(invalid_credentials)?;

    let candidate = input.password.clone();
    let stored_hash = user.password_hash.clone();
    let password_valid = task::spawn_blocking(move || verify_password(&candidate, &stored_hash))
        .await
        .map_err(|e| AppError::InternalError(format!("Password verification task failed: {e}")))?
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(invalid_credentials());
    }

    let issued = state.sessions.issue_token(user.id).await?;
    let cookie = session_cookie(
        issued.token,
        state.config.cookie_secure,
        state.sessions.ttl().as_secs() as i64,
    );

    tracing::info!(user_id = user.id, token_id = %issued.token_id, "User logged in");
    Ok((jar.add(cookie), Json(DataResponse::new(user.into()))))
}

/// GET /api/users/_current
pub async fn current(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse::new(user.into())))
}

/// PATCH /api/users/_current
///
/// Change the caller's name and/or password. Existing sessions stay valid.
pub async fn update_current(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<UpdateCurrentUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if input.name.is_none() && input.password.is_none() {
        return Err(CoreError::Validation("Provide a name or a password to update".into()).into());
    }

    let password_hash = match input.password.as_deref() {
        Some(password) if password.chars().count() < PASSWORD_MIN_LENGTH => {
            return Err(CoreError::Validation(format!(
                "password must be at least {PASSWORD_MIN_LENGTH} characters"
            ))
            .into());
        }
        Some(password) => {
            let password = password.to_owned();
            Some(
                task::spawn_blocking(move || hash_password(&password))
                    .await
                    .map_err(|e| AppError::InternalError(format!("Password hashing task failed: {e}")))?
                    .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?,
            )
        }
        None => None,
    };

    let update = UpdateUser {
        name: input.name.map(|n| n.trim().to_string()),
        password_hash,
    };
    let user = UserRepo::update(&state.pool, auth.user_id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    tracing::info!(
        user_id = user.id,
        password_changed = update.password_hash.is_some(),
        "Current user updated"
    );
    Ok(Json(DataResponse::new(user.into())))
}

/// POST|DELETE /api/users/_logout
///
/// Revoke the session and clear the cookie. Returns 204 No Content.
pub async fn logout(
    auth: AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, StatusCode)> {
    state.sessions.revoke_token(&auth.token_id).await?;
    tracing::info!(user_id = auth.user_id, token_id = %auth.token_id, "User logged out");
    Ok((
        jar.add(expired_session_cookie(state.config.cookie_secure)),
        StatusCode::NO_CONTENT,
    ))
}
