//! Landing-page carousel slides.

use pura_core::entity_scope::EntityType;
use pura_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::content::{default_active, BindQuery, ContentEntity, ContentInput};

/// A row from the `hero_slides` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HeroSlide {
    pub id: DbId,
    pub entity_type: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Create/update payload for a hero slide.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HeroSlideInput {
    pub entity_type: EntityType,
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub title: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub subtitle: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: String,
    #[validate(url(message = "must be a valid URL"))]
    pub link_url: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order_index: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl ContentInput for HeroSlideInput {
    const FIELDS: &'static [&'static str] = &[
        "entity_type",
        "title",
        "subtitle",
        "image_url",
        "link_url",
        "order_index",
        "is_active",
    ];

    fn bind_fields<'q, O>(&'q self, query: BindQuery<'q, O>) -> BindQuery<'q, O> {
        query
            .bind(self.entity_type.as_str())
            .bind(&self.title)
            .bind(&self.subtitle)
            .bind(&self.image_url)
            .bind(&self.link_url)
            .bind(self.order_index)
            .bind(self.is_active)
    }
}

impl ContentEntity for HeroSlide {
    type Input = HeroSlideInput;

    const NAME: &'static str = "HeroSlide";
    const TABLE: &'static str = "hero_slides";
    const COLUMNS: &'static str = "id, entity_type, title, subtitle, image_url, link_url, \
                                   order_index, is_active, created_at, updated_at";
    const SCOPED: bool = true;
}
