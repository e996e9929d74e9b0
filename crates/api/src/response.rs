//! Shared response envelope for API handlers.
//!
//! Successful responses are `{ "data": ... }`, plus `"paging"` on paged
//! lists. Errors use the `"errors"` member instead (see [`crate::error`]).

use pura_core::paging::Paging;
use serde::Serialize;

/// Standard `{ "data": T, "paging"?: {...} }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse::new(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data, paging: None }
    }

    pub fn paged(data: T, paging: Option<Paging>) -> Self {
        Self { data, paging }
    }
}
