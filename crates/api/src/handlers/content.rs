//! Generic handlers for the flat content types.
//!
//! Each function is instantiated per entity by
//! [`admin_router`](crate::routes::content::admin_router) and
//! [`public_router`](crate::routes::content::public_router),
//! e.g. `get(content::list::<Faq>)`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pura_core::entity_scope::EntityType;
use pura_core::error::CoreError;
use pura_core::paging::PageRequest;
use pura_core::types::DbId;
use pura_db::models::content::ContentEntity;
use pura_db::repositories::ContentRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for admin lists.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub entity_type: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// Query parameters for public lists.
#[derive(Debug, Default, Deserialize)]
pub struct PublicListParams {
    pub entity_type: Option<String>,
}

/// Parse an optional `entity_type` filter; an empty value means no filter.
pub fn parse_scope(raw: Option<&str>) -> AppResult<Option<EntityType>> {
    Ok(raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<EntityType>)
        .transpose()?)
}

fn not_found<E: ContentEntity>(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: E::NAME, id })
}

/// GET /api/{resource}
pub async fn list<E: ContentEntity>(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<E>>>> {
    let scope = parse_scope(params.entity_type.as_deref())?;
    let page = PageRequest::from_query(params.page, params.size);

    let items = ContentRepo::<E>::list(&state.pool, scope, page).await?;
    let paging = match page {
        Some(page) => Some(page.paging(ContentRepo::<E>::count(&state.pool, scope).await?)),
        None => None,
    };

    tracing::debug!(entity = E::NAME, count = items.len(), "Listed content");
    Ok(Json(DataResponse::paged(items, paging)))
}

/// GET /api/{resource}/{id}
pub async fn get_by_id<E: ContentEntity>(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<E>>> {
    let item = ContentRepo::<E>::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found::<E>(id))?;
    Ok(Json(DataResponse::new(item)))
}

/// POST /api/{resource}
pub async fn create<E: ContentEntity>(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<E::Input>,
) -> AppResult<(StatusCode, Json<DataResponse<E>>)> {
    let created = ContentRepo::<E>::create(&state.pool, &input).await?;
    tracing::info!(entity = E::NAME, user_id = auth.user_id, "Content created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(created))))
}

/// PUT /api/{resource}/{id}
///
/// Replaces every writable column.
pub async fn update<E: ContentEntity>(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<E::Input>,
) -> AppResult<Json<DataResponse<E>>> {
    let updated = ContentRepo::<E>::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found::<E>(id))?;
    tracing::info!(entity = E::NAME, id, user_id = auth.user_id, "Content updated");
    Ok(Json(DataResponse::new(updated)))
}

/// DELETE /api/{resource}/{id}
///
/// Refused with 409 while other rows still reference the record.
pub async fn delete<E: ContentEntity>(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ContentRepo::<E>::is_referenced(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "{} with id {id} is in use and cannot be deleted",
            E::NAME
        ))));
    }

    if ContentRepo::<E>::delete(&state.pool, id).await? {
        tracing::info!(entity = E::NAME, id, user_id = auth.user_id, "Content deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found::<E>(id))
    }
}

/// GET /api/public/{resource}
///
/// Active rows only, unpaged.
pub async fn list_public<E: ContentEntity>(
    State(state): State<AppState>,
    Query(params): Query<PublicListParams>,
) -> AppResult<Json<DataResponse<Vec<E>>>> {
    let scope = parse_scope(params.entity_type.as_deref())?;
    let items = ContentRepo::<E>::list_public(&state.pool, scope).await?;
    Ok(Json(DataResponse::new(items)))
}

/// GET /api/public/{resource}/{id}
///
/// Inactive rows are reported as not found.
pub async fn get_public<E: ContentEntity>(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<E>>> {
    let item = ContentRepo::<E>::find_public_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found::<E>(id))?;
    Ok(Json(DataResponse::new(item)))
}
