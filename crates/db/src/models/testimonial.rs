//! Visitor and member testimonials.

use pura_core::entity_scope::EntityType;
use pura_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::content::{default_active, BindQuery, ContentEntity, ContentInput};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Testimonial {
    pub id: DbId,
    pub entity_type: String,
    pub name: String,
    pub role: Option<String>,
    pub quote: String,
    pub avatar_url: Option<String>,
    /// Star rating, 1 to 5.
    pub rating: i16,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn default_rating() -> i16 {
    5
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TestimonialInput {
    pub entity_type: EntityType,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub role: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "must be 1-2000 characters"))]
    pub quote: String,
    #[validate(url(message = "must be a valid URL"))]
    pub avatar_url: Option<String>,
    #[serde(default = "default_rating")]
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: i16,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order_index: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl ContentInput for TestimonialInput {
    const FIELDS: &'static [&'static str] = &[
        "entity_type",
        "name",
        "role",
        "quote",
        "avatar_url",
        "rating",
        "order_index",
        "is_active",
    ];

    fn bind_fields<'q, O>(&'q self, query: BindQuery<'q, O>) -> BindQuery<'q, O> {
        query
            .bind(self.entity_type.as_str())
            .bind(&self.name)
            .bind(&self.role)
            .bind(&self.quote)
            .bind(&self.avatar_url)
            .bind(self.rating)
            .bind(self.order_index)
            .bind(self.is_active)
    }
}

impl ContentEntity for Testimonial {
    type Input = TestimonialInput;

    const NAME: &'static str = "Testimonial";
    const TABLE: &'static str = "testimonials";
    const COLUMNS: &'static str = "id, entity_type, name, role, quote, avatar_url, rating, \
                                   order_index, is_active, created_at, updated_at";
    const SCOPED: bool = true;
}
