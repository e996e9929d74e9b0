//! Frequently asked questions.

use pura_core::entity_scope::EntityType;
use pura_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::content::{default_active, BindQuery, ContentEntity, ContentInput};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Faq {
    pub id: DbId,
    pub entity_type: String,
    pub question: String,
    pub answer: String,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FaqInput {
    pub entity_type: EntityType,
    #[validate(length(min = 1, max = 500, message = "must be 1-500 characters"))]
    pub question: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub answer: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub order_index: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl ContentInput for FaqInput {
    const FIELDS: &'static [&'static str] =
        &["entity_type", "question", "answer", "order_index", "is_active"];

    fn bind_fields<'q, O>(&'q self, query: BindQuery<'q, O>) -> BindQuery<'q, O> {
        query
            .bind(self.entity_type.as_str())
            .bind(&self.question)
            .bind(&self.answer)
            .bind(self.order_index)
            .bind(self.is_active)
    }
}

impl ContentEntity for Faq {
    type Input = FaqInput;

    const NAME: &'static str = "Faq";
    const TABLE: &'static str = "faqs";
    const COLUMNS: &'static str =
        "id, entity_type, question, answer, order_index, is_active, created_at, updated_at";
    const SCOPED: bool = true;
}
