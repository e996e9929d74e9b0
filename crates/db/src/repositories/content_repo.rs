//! Generic repository over the flat content tables.
//!
//! SQL is assembled from the [`ContentEntity`] constants; table and column
//! names are compile-time literals, values are always bound.

use std::marker::PhantomData;

use pura_core::entity_scope::EntityType;
use pura_core::paging::PageRequest;
use pura_core::types::DbId;
use sqlx::PgPool;

use crate::models::content::{ContentEntity, ContentInput};

/// CRUD operations for one content type, e.g. `ContentRepo::<Faq>::list(..)`.
pub struct ContentRepo<E>(PhantomData<E>);

impl<E: ContentEntity> ContentRepo<E> {
    /// `WHERE` clause for an optional scope. Unscoped tables ignore the scope.
    fn scope_clause(scope: Option<EntityType>, public: bool) -> (String, Option<&'static str>) {
        let scope = scope.filter(|_| E::SCOPED);
        let mut conditions = Vec::new();
        if scope.is_some() {
            conditions.push("entity_type = $1");
        }
        if public {
            conditions.push("is_active = TRUE");
        }
        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        (clause, scope.map(|s| s.as_str()))
    }

    /// List rows for the admin CMS, ordered by `order_index` then `id`.
    pub async fn list(
        pool: &PgPool,
        scope: Option<EntityType>,
        page: Option<PageRequest>,
    ) -> Result<Vec<E>, sqlx::Error> {
        Self::select(pool, scope, page, false).await
    }

    /// List active rows only, ordered by `order_index` then `id`.
    pub async fn list_public(
        pool: &PgPool,
        scope: Option<EntityType>,
    ) -> Result<Vec<E>, sqlx::Error> {
        Self::select(pool, scope, None, true).await
    }

    async fn select(
        pool: &PgPool,
        scope: Option<EntityType>,
        page: Option<PageRequest>,
        public: bool,
    ) -> Result<Vec<E>, sqlx::Error> {
        let (clause, scope) = Self::scope_clause(scope, public);
        let mut query = format!(
            "SELECT {} FROM {} {clause} ORDER BY order_index ASC, id ASC",
            E::COLUMNS,
            E::TABLE
        );
        let next = if scope.is_some() { 2 } else { 1 };
        if page.is_some() {
            query.push_str(&format!(" LIMIT ${next} OFFSET ${}", next + 1));
        }

        let mut q = sqlx::query_as::<_, E>(&query);
        if let Some(scope) = scope {
            q = q.bind(scope);
        }
        if let Some(page) = page {
            q = q.bind(page.limit()).bind(page.offset());
        }
        q.fetch_all(pool).await
    }

    /// Count rows matching the admin list filter.
    pub async fn count(pool: &PgPool, scope: Option<EntityType>) -> Result<i64, sqlx::Error> {
        let (clause, scope) = Self::scope_clause(scope, false);
        let query = format!("SELECT COUNT(*) FROM {} {clause}", E::TABLE);
        let mut q = sqlx::query_scalar::<_, i64>(&query);
        if let Some(scope) = scope {
            q = q.bind(scope);
        }
        q.fetch_one(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<E>, sqlx::Error> {
        let query = format!("SELECT {} FROM {} WHERE id = $1", E::COLUMNS, E::TABLE);
        sqlx::query_as::<_, E>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active row by ID. Inactive rows are reported as absent.
    pub async fn find_public_by_id(pool: &PgPool, id: DbId) -> Result<Option<E>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1 AND is_active = TRUE",
            E::COLUMNS,
            E::TABLE
        );
        sqlx::query_as::<_, E>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new row, returning it.
    pub async fn create(pool: &PgPool, input: &E::Input) -> Result<E, sqlx::Error> {
        let fields = <E::Input as ContentInput>::FIELDS;
        let placeholders = (1..=fields.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders}) RETURNING {}",
            E::TABLE,
            fields.join(", "),
            E::COLUMNS
        );
        input
            .bind_fields(sqlx::query_as::<_, E>(&query))
            .fetch_one(pool)
            .await
    }

    /// Replace every writable column of a row.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &E::Input,
    ) -> Result<Option<E>, sqlx::Error> {
        let assignments = <E::Input as ContentInput>::FIELDS
            .iter()
            .enumerate()
            .map(|(i, field)| format!("{field} = ${}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "UPDATE {} SET {assignments}, updated_at = NOW() WHERE id = $1 RETURNING {}",
            E::TABLE,
            E::COLUMNS
        );
        input
            .bind_fields(sqlx::query_as::<_, E>(&query).bind(id))
            .fetch_optional(pool)
            .await
    }

    /// Delete a row. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether any row in [`ContentEntity::REFERENCED_BY`] points at `id`.
    pub async fn is_referenced(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        for (table, column) in E::REFERENCED_BY {
            let query = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE {column} = $1)");
            let exists: bool = sqlx::query_scalar(&query).bind(id).fetch_one(pool).await?;
            if exists {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
