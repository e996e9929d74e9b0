//! Recurring programs (classes, study groups, youth activities).

use pura_core::entity_scope::EntityType;
use pura_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::content::{default_active, BindQuery, ContentEntity, ContentInput};

/// A row from the `programs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Program {
    pub id: DbId,
    pub entity_type: String,
    pub name: String,
    pub description: Option<String>,
    /// Human-readable schedule, e.g. `"Every Saturday, 08:00"`.
    pub schedule: Option<String>,
    pub image_url: Option<String>,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProgramInput {
    pub entity_type: EntityType,
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub schedule: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order_index: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl ContentInput for ProgramInput {
    const FIELDS: &'static [&'static str] = &[
        "entity_type",
        "name",
        "description",
        "schedule",
        "image_url",
        "order_index",
        "is_active",
    ];

    fn bind_fields<'q, O>(&'q self, query: BindQuery<'q, O>) -> BindQuery<'q, O> {
        query
            .bind(self.entity_type.as_str())
            .bind(&self.name)
            .bind(&self.description)
            .bind(&self.schedule)
            .bind(&self.image_url)
            .bind(self.order_index)
            .bind(self.is_active)
    }
}

impl ContentEntity for Program {
    type Input = ProgramInput;

    const NAME: &'static str = "Program";
    const TABLE: &'static str = "programs";
    const COLUMNS: &'static str = "id, entity_type, name, description, schedule, image_url, \
                                   order_index, is_active, created_at, updated_at";
    const SCOPED: bool = true;
}
