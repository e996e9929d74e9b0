//! Organization structure: board members, priests, teachers.

use pura_core::entity_scope::EntityType;
use pura_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::content::{default_active, BindQuery, ContentEntity, ContentInput};

/// A row from the `org_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrgMember {
    pub id: DbId,
    pub entity_type: String,
    pub name: String,
    pub position: String,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrgMemberInput {
    pub entity_type: EntityType,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub position: String,
    #[validate(url(message = "must be a valid URL"))]
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order_index: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl ContentInput for OrgMemberInput {
    const FIELDS: &'static [&'static str] = &[
        "entity_type",
        "name",
        "position",
        "photo_url",
        "bio",
        "order_index",
        "is_active",
    ];

    fn bind_fields<'q, O>(&'q self, query: BindQuery<'q, O>) -> BindQuery<'q, O> {
        query
            .bind(self.entity_type.as_str())
            .bind(&self.name)
            .bind(&self.position)
            .bind(&self.photo_url)
            .bind(&self.bio)
            .bind(self.order_index)
            .bind(self.is_active)
    }
}

impl ContentEntity for OrgMember {
    type Input = OrgMemberInput;

    const NAME: &'static str = "OrgMember";
    const TABLE: &'static str = "org_members";
    const COLUMNS: &'static str = "id, entity_type, name, position, photo_url, bio, \
                                   order_index, is_active, created_at, updated_at";
    const SCOPED: bool = true;
}
