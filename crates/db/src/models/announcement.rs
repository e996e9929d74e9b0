//! Time-boxed announcements shown in the site banner.

use pura_core::entity_scope::EntityType;
use pura_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::content::{default_active, BindQuery, ContentEntity, ContentInput};

/// A row from the `announcements` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Announcement {
    pub id: DbId,
    pub entity_type: String,
    pub title: String,
    pub content: String,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_window", skip_on_field_errors = false))]
pub struct AnnouncementInput {
    pub entity_type: EntityType,
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: String,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order_index: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn validate_window(input: &AnnouncementInput) -> Result<(), ValidationError> {
    match (input.starts_at, input.ends_at) {
        (Some(start), Some(end)) if end <= start => {
            let mut err = ValidationError::new("window");
            err.message = Some("ends_at must be after starts_at".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

impl ContentInput for AnnouncementInput {
    const FIELDS: &'static [&'static str] = &[
        "entity_type",
        "title",
        "content",
        "starts_at",
        "ends_at",
        "order_index",
        "is_active",
    ];

    fn bind_fields<'q, O>(&'q self, query: BindQuery<'q, O>) -> BindQuery<'q, O> {
        query
            .bind(self.entity_type.as_str())
            .bind(&self.title)
            .bind(&self.content)
            .bind(self.starts_at)
            .bind(self.ends_at)
            .bind(self.order_index)
            .bind(self.is_active)
    }
}

impl ContentEntity for Announcement {
    type Input = AnnouncementInput;

    const NAME: &'static str = "Announcement";
    const TABLE: &'static str = "announcements";
    const COLUMNS: &'static str = "id, entity_type, title, content, starts_at, ends_at, \
                                   order_index, is_active, created_at, updated_at";
    const SCOPED: bool = true;
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use pura_core::validation::validate_request;

    use super::*;

    fn input() -> AnnouncementInput {
        AnnouncementInput {
            entity_type: EntityType::Pura,
            title: "Piodalan".into(),
            content: "Upacara piodalan dimulai pukul 09.00".into(),
            starts_at: None,
            ends_at: None,
            order_index: 0,
            is_active: true,
        }
    }

    #[test]
    fn open_window_is_valid() {
        assert!(validate_request(&input()).is_ok());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let now = Utc::now();
        let bad = AnnouncementInput {
            starts_at: Some(now),
            ends_at: Some(now - Duration::hours(1)),
            ..input()
        };
        let err = validate_request(&bad).unwrap_err().to_string();
        assert!(err.contains("ends_at must be after starts_at"), "{err}");
    }
}
