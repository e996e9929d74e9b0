//! Article categories (shared across organizations).

use pura_core::types::{DbId, Timestamp};
use pura_core::validation::SLUG_REGEX;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::content::{default_active, BindQuery, ContentEntity, ContentInput};

/// A row from the `article_categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ArticleCategory {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ArticleCategoryInput {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(
        length(min = 1, max = 120, message = "must be 1-120 characters"),
        regex(path = *SLUG_REGEX, message = "must be a lowercase slug")
    )]
    pub slug: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order_index: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl ContentInput for ArticleCategoryInput {
    const FIELDS: &'static [&'static str] = &["name", "slug", "order_index", "is_active"];

    fn bind_fields<'q, O>(&'q self, query: BindQuery<'q, O>) -> BindQuery<'q, O> {
        query
            .bind(&self.name)
            .bind(&self.slug)
            .bind(self.order_index)
            .bind(self.is_active)
    }
}

impl ContentEntity for ArticleCategory {
    type Input = ArticleCategoryInput;

    const NAME: &'static str = "ArticleCategory";
    const TABLE: &'static str = "article_categories";
    const COLUMNS: &'static str = "id, name, slug, order_index, is_active, created_at, updated_at";
    const SCOPED: bool = false;
    const REFERENCED_BY: &'static [(&'static str, &'static str)] = &[("articles", "category_id")];
}
