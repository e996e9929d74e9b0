//! News and blog articles.

use pura_core::entity_scope::EntityType;
use pura_core::types::{DbId, Timestamp};
use pura_core::validation::SLUG_REGEX;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::content::{default_active, BindQuery, ContentEntity, ContentInput};

/// A row from the `articles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Article {
    pub id: DbId,
    pub entity_type: String,
    pub title: String,
    /// Unique across all organizations.
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub category_id: Option<DbId>,
    pub author: Option<String>,
    pub published_at: Option<Timestamp>,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Create/update payload for an article.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ArticleInput {
    pub entity_type: EntityType,
    #[validate(length(min = 1, max = 255, message = "must be 1-255 characters"))]
    pub title: String,
    #[validate(
        length(min = 1, max = 255, message = "must be 1-255 characters"),
        regex(path = *SLUG_REGEX, message = "must be a lowercase slug")
    )]
    pub slug: String,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub excerpt: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: String,
    #[validate(url(message = "must be a valid URL"))]
    pub cover_image_url: Option<String>,
    pub category_id: Option<DbId>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub author: Option<String>,
    pub published_at: Option<Timestamp>,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order_index: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl ContentInput for ArticleInput {
    const FIELDS: &'static [&'static str] = &[
        "entity_type",
        "title",
        "slug",
        "excerpt",
        "content",
        "cover_image_url",
        "category_id",
        "author",
        "published_at",
        "order_index",
        "is_active",
    ];

    fn bind_fields<'q, O>(&'q self, query: BindQuery<'q, O>) -> BindQuery<'q, O> {
        query
            .bind(self.entity_type.as_str())
            .bind(&self.title)
            .bind(&self.slug)
            .bind(&self.excerpt)
            .bind(&self.content)
            .bind(&self.cover_image_url)
            .bind(self.category_id)
            .bind(&self.author)
            .bind(self.published_at)
            .bind(self.order_index)
            .bind(self.is_active)
    }
}

impl ContentEntity for Article {
    type Input = ArticleInput;

    const NAME: &'static str = "Article";
    const TABLE: &'static str = "articles";
    const COLUMNS: &'static str = "id, entity_type, title, slug, excerpt, content, cover_image_url, \
                                   category_id, author, published_at, \
                                   order_index, is_active, created_at, updated_at";
    const SCOPED: bool = true;
}
