//! Shared contract for flat content tables.
//!
//! Every content type is a row struct implementing [`ContentEntity`] plus a
//! request DTO implementing [`ContentInput`]. The DTO is used for both create
//! and update (updates replace every writable column), so
//! [`ContentRepo`](crate::repositories::ContentRepo) can build its INSERT and
//! UPDATE statements from [`ContentInput::FIELDS`] alone.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, Postgres};
use validator::Validate;

/// A `query_as` builder over Postgres with positional arguments.
pub type BindQuery<'q, O> = QueryAs<'q, Postgres, O, PgArguments>;

/// Request payload for one content type.
pub trait ContentInput: DeserializeOwned + Validate + Send + Sync + 'static {
    /// Writable columns, in the order [`bind_fields`](Self::bind_fields)
    /// binds them.
    const FIELDS: &'static [&'static str];

    /// Bind every column in [`FIELDS`](Self::FIELDS) order.
    fn bind_fields<'q, O>(&'q self, query: BindQuery<'q, O>) -> BindQuery<'q, O>;
}

/// A row from a content table.
///
/// Tables are expected to carry `id`, `order_index`, `is_active`,
/// `created_at` and `updated_at`; scoped tables also carry `entity_type`.
pub trait ContentEntity: for<'r> FromRow<'r, PgRow> + Serialize + Send + Unpin + 'static {
    type Input: ContentInput;

    /// Entity name used in not-found messages.
    const NAME: &'static str;
    const TABLE: &'static str;
    /// Column list for SELECT and RETURNING.
    const COLUMNS: &'static str;
    /// Whether the table has an `entity_type` column.
    const SCOPED: bool;
    /// `(table, column)` pairs holding foreign keys to this table. Deleting a
    /// row that is still referenced is refused.
    const REFERENCED_BY: &'static [(&'static str, &'static str)] = &[];
}

/// Serde default for `is_active` on create/update payloads.
pub fn default_active() -> bool {
    true
}
