//! Photo gallery entries.

use pura_core::entity_scope::EntityType;
use pura_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::content::{default_active, BindQuery, ContentEntity, ContentInput};

/// A row from the `galleries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Gallery {
    pub id: DbId,
    pub entity_type: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    /// Free-form grouping label (e.g. `"upacara"`).
    pub category: Option<String>,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GalleryInput {
    pub entity_type: EntityType,
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: String,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub category: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order_index: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl ContentInput for GalleryInput {
    const FIELDS: &'static [&'static str] = &[
        "entity_type",
        "title",
        "description",
        "image_url",
        "category",
        "order_index",
        "is_active",
    ];

    fn bind_fields<'q, O>(&'q self, query: BindQuery<'q, O>) -> BindQuery<'q, O> {
        query
            .bind(self.entity_type.as_str())
            .bind(&self.title)
            .bind(&self.description)
            .bind(&self.image_url)
            .bind(&self.category)
            .bind(self.order_index)
            .bind(self.is_active)
    }
}

impl ContentEntity for Gallery {
    type Input = GalleryInput;

    const NAME: &'static str = "Gallery";
    const TABLE: &'static str = "galleries";
    const COLUMNS: &'static str = "id, entity_type, title, description, image_url, category, \
                                   order_index, is_active, created_at, updated_at";
    const SCOPED: bool = true;
}
