//! Activities and ceremonies (odalan, classes, community events).

use chrono::NaiveDate;
use pura_core::entity_scope::EntityType;
use pura_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::content::{default_active, BindQuery, ContentEntity, ContentInput};

/// A row from the `activities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Activity {
    pub id: DbId,
    pub entity_type: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ActivityInput {
    pub entity_type: EntityType,
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub image_url: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub location: Option<String>,
    /// `YYYY-MM-DD`.
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order_index: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl ContentInput for ActivityInput {
    const FIELDS: &'static [&'static str] = &[
        "entity_type",
        "title",
        "description",
        "image_url",
        "location",
        "event_date",
        "order_index",
        "is_active",
    ];

    fn bind_fields<'q, O>(&'q self, query: BindQuery<'q, O>) -> BindQuery<'q, O> {
        query
            .bind(self.entity_type.as_str())
            .bind(&self.title)
            .bind(&self.description)
            .bind(&self.image_url)
            .bind(&self.location)
            .bind(self.event_date)
            .bind(self.order_index)
            .bind(self.is_active)
    }
}

impl ContentEntity for Activity {
    type Input = ActivityInput;

    const NAME: &'static str = "Activity";
    const TABLE: &'static str = "activities";
    const COLUMNS: &'static str = "id, entity_type, title, description, image_url, location, \
                                   event_date, order_index, is_active, created_at, updated_at";
    const SCOPED: bool = true;
}
