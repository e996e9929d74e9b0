//! Handlers for `/storage`: image upload and object deletion.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use pura_core::image_variants::{
    is_accepted_content_type, ACCEPTED_CONTENT_TYPES, MAX_UPLOAD_BYTES, UPLOAD_PREFIX,
};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::pipeline::{ImageUpload, UploadPipeline, VariantSet};

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Request body for `DELETE /storage`.
#[derive(Debug, Deserialize, Validate)]
pub struct DeleteObjectsRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub keys: Vec<String>,
}

/// Whether `key` lies under the upload prefix.
fn is_upload_key(key: &str) -> bool {
    key.strip_prefix(UPLOAD_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|rest| !rest.is_empty() && !rest.split('/').any(|seg| seg == ".."))
}

/// POST /api/storage/upload
///
/// Accepts one image in the `file` field and returns the uploaded variant
/// for every preset.
pub async fn upload(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<VariantSet>>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("image").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        if !is_accepted_content_type(&content_type) {
            return Err(AppError::BadRequest(format!(
                "Unsupported content type '{content_type}'. Accepted: {}",
                ACCEPTED_CONTENT_TYPES.join(", ")
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::BadRequest(format!(
                "File exceeds the {} MiB limit",
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }

        let size = bytes.len();
        let upload = ImageUpload {
            filename,
            content_type,
            bytes: bytes.to_vec(),
            timestamp: Utc::now().timestamp(),
        };
        let variants = UploadPipeline::new(Arc::clone(&state.objects))
            .run(upload)
            .await?;

        tracing::info!(user_id = auth.user_id, size, variants = variants.len(), "Image uploaded");
        return Ok((StatusCode::CREATED, Json(DataResponse::new(variants))));
    }

    Err(AppError::BadRequest(format!(
        "Missing multipart field '{FILE_FIELD}'"
    )))
}

/// DELETE /api/storage
///
/// Removes the given keys. Every key must lie under `uploads/`; nothing is
/// deleted if any key does not.
pub async fn delete_objects(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<DeleteObjectsRequest>,
) -> AppResult<StatusCode> {
    if let Some(bad) = input.keys.iter().find(|k| !is_upload_key(k)) {
        return Err(AppError::BadRequest(format!(
            "Key '{bad}' is outside '{UPLOAD_PREFIX}/'"
        )));
    }

    for key in &input.keys {
        state.objects.delete(key).await?;
    }

    tracing::info!(user_id = auth.user_id, count = input.keys.len(), "Objects deleted");
    Ok(StatusCode::NO_CONTENT)
}
