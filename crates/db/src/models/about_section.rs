//! About sections and their ordered child values.
//!
//! Unlike the flat content tables, an about section owns a `values`
//! collection that is replaced as a whole on every update, so it has its own
//! repository ([`AboutSectionRepo`](crate::repositories::AboutSectionRepo)).

use pura_core::entity_scope::EntityType;
use pura_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::content::default_active;

/// A row from the `about_sections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AboutSection {
    pub id: DbId,
    pub entity_type: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub vision: Option<String>,
    pub mission: Option<String>,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `about_values` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AboutValue {
    pub id: DbId,
    pub about_section_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub order_index: i32,
    pub created_at: Timestamp,
}

/// An about section together with its values, ordered by `order_index`.
#[derive(Debug, Clone, Serialize)]
pub struct AboutSectionWithValues {
    #[serde(flatten)]
    pub section: AboutSection,
    pub values: Vec<AboutValue>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AboutValueInput {
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub icon: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order_index: i32,
}

/// Create/update payload. On update, `values` replaces every existing value.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AboutSectionInput {
    pub entity_type: EntityType,
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub description: String,
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: Option<String>,
    pub vision: Option<String>,
    pub mission: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order_index: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    #[validate(nested)]
    pub values: Vec<AboutValueInput>,
}
