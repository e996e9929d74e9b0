//! Handlers for `/about-sections`: sections plus their ordered values.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pura_core::error::CoreError;
use pura_core::paging::PageRequest;
use pura_core::types::DbId;
use pura_db::models::about_section::{AboutSectionInput, AboutSectionWithValues};
use pura_db::repositories::AboutSectionRepo;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::handlers::content::{parse_scope, ListParams, PublicListParams};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "AboutSection";

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<AboutSectionWithValues>>>> {
    let scope = parse_scope(params.entity_type.as_deref())?;
    let page = PageRequest::from_query(params.page, params.size);

    let items = AboutSectionRepo::list(&state.pool, scope, page, false).await?;
    let paging = match page {
        Some(page) => Some(page.paging(AboutSectionRepo::count(&state.pool, scope).await?)),
        None => None,
    };
    Ok(Json(DataResponse::paged(items, paging)))
}

pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AboutSectionWithValues>>> {
    let item = AboutSectionRepo::find_by_id(&state.pool, id, false)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(item)))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<AboutSectionInput>,
) -> AppResult<(StatusCode, Json<DataResponse<AboutSectionWithValues>>)> {
    let created = AboutSectionRepo::create(&state.pool, &input).await?;
    tracing::info!(
        id = created.section.id,
        values = created.values.len(),
        user_id = auth.user_id,
        "About section created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(created))))
}

/// PUT /api/about-sections/{id}
///
/// The submitted `values` replace every existing value.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<AboutSectionInput>,
) -> AppResult<Json<DataResponse<AboutSectionWithValues>>> {
    let updated = AboutSectionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(id, values = updated.values.len(), user_id = auth.user_id, "About section updated");
    Ok(Json(DataResponse::new(updated)))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if AboutSectionRepo::delete(&state.pool, id).await? {
        tracing::info!(id, user_id = auth.user_id, "About section deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

pub async fn list_public(
    State(state): State<AppState>,
    Query(params): Query<PublicListParams>,
) -> AppResult<Json<DataResponse<Vec<AboutSectionWithValues>>>> {
    let scope = parse_scope(params.entity_type.as_deref())?;
    let items = AboutSectionRepo::list(&state.pool, scope, None, true).await?;
    Ok(Json(DataResponse::new(items)))
}

pub async fn get_public(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AboutSectionWithValues>>> {
    let item = AboutSectionRepo::find_by_id(&state.pool, id, true)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(item)))
}
