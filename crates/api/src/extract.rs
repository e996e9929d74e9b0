//! Request extractors shared by handlers.

use axum::extract::{FromRequest, Request};
use axum::Json;
use pura_core::validation::validate_request;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body that has been deserialized and validated.
///
/// Malformed JSON and failed validation both reject with 400 before the
/// handler body runs.
///
/// ```ignore
/// async fn create(ValidatedJson(input): ValidatedJson<FaqInput>) -> AppResult<..> { .. }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        validate_request(&value)?;
        Ok(Self(value))
    }
}
