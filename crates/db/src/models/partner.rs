//! Partner and sponsor logos (shared across organizations).

use pura_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::content::{default_active, BindQuery, ContentEntity, ContentInput};

/// A row from the `partners` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Partner {
    pub id: DbId,
    pub name: String,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PartnerInput {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub name: String,
    #[validate(url(message = "must be a valid URL"))]
    pub logo_url: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub website_url: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order_index: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl ContentInput for PartnerInput {
    const FIELDS: &'static [&'static str] =
        &["name", "logo_url", "website_url", "order_index", "is_active"];

    fn bind_fields<'q, O>(&'q self, query: BindQuery<'q, O>) -> BindQuery<'q, O> {
        query
            .bind(&self.name)
            .bind(&self.logo_url)
            .bind(&self.website_url)
            .bind(self.order_index)
            .bind(self.is_active)
    }
}

impl ContentEntity for Partner {
    type Input = PartnerInput;

    const NAME: &'static str = "Partner";
    const TABLE: &'static str = "partners";
    const COLUMNS: &'static str =
        "id, name, logo_url, website_url, order_index, is_active, created_at, updated_at";
    const SCOPED: bool = false;
}
