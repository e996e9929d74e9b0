//! Repository for `about_sections` and their `about_values`.

use std::collections::HashMap;

use pura_core::entity_scope::EntityType;
use pura_core::paging::PageRequest;
use pura_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::about_section::{
    AboutSection, AboutSectionInput, AboutSectionWithValues, AboutValue, AboutValueInput,
};

const COLUMNS: &str = "id, entity_type, title, description, image_url, vision, mission, \
                       order_index, is_active, created_at, updated_at";

const VALUE_COLUMNS: &str = "id, about_section_id, title, description, icon, order_index, created_at";

pub struct AboutSectionRepo;

impl AboutSectionRepo {
    /// List sections with their values, ordered by `order_index` then `id`.
    pub async fn list(
        pool: &PgPool,
        scope: Option<EntityType>,
        page: Option<PageRequest>,
        public: bool,
    ) -> Result<Vec<AboutSectionWithValues>, sqlx::Error> {
        let mut conditions = Vec::new();
        let mut next = 1;
        if scope.is_some() {
            conditions.push(format!("entity_type = ${next}"));
            next += 1;
        }
        if public {
            conditions.push("is_active = TRUE".to_string());
        }
        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let mut query = format!(
            "SELECT {COLUMNS} FROM about_sections {clause} ORDER BY order_index ASC, id ASC"
        );
        if page.is_some() {
            query.push_str(&format!(" LIMIT ${next} OFFSET ${}", next + 1));
        }

        let mut q = sqlx::query_as::<_, AboutSection>(&query);
        if let Some(scope) = scope {
            q = q.bind(scope.as_str());
        }
        if let Some(page) = page {
            q = q.bind(page.limit()).bind(page.offset());
        }
        let sections = q.fetch_all(pool).await?;
        Self::attach_values(pool, sections).await
    }

    pub async fn count(pool: &PgPool, scope: Option<EntityType>) -> Result<i64, sqlx::Error> {
        match scope {
            Some(scope) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM about_sections WHERE entity_type = $1")
                    .bind(scope.as_str())
                    .fetch_one(pool)
                    .await
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM about_sections")
                    .fetch_one(pool)
                    .await
            }
        }
    }

    /// Find a section with its values. With `public`, inactive sections are
    /// reported as absent.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        public: bool,
    ) -> Result<Option<AboutSectionWithValues>, sqlx::Error> {
        let filter = if public { " AND is_active = TRUE" } else { "" };
        let query = format!("SELECT {COLUMNS} FROM about_sections WHERE id = $1{filter}");
        let section = sqlx::query_as::<_, AboutSection>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        match section {
            Some(section) => {
                let values = Self::values_for(pool, section.id).await?;
                Ok(Some(AboutSectionWithValues { section, values }))
            }
            None => Ok(None),
        }
    }

    /// Insert a section and its values in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &AboutSectionInput,
    ) -> Result<AboutSectionWithValues, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO about_sections
                (entity_type, title, description, image_url, vision, mission, order_index, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        let section = sqlx::query_as::<_, AboutSection>(&query)
            .bind(input.entity_type.as_str())
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(&input.vision)
            .bind(&input.mission)
            .bind(input.order_index)
            .bind(input.is_active)
            .fetch_one(&mut *tx)
            .await?;
        let values = Self::insert_values(&mut *tx, section.id, &input.values).await?;

        tx.commit().await?;
        Ok(AboutSectionWithValues { section, values })
    }

    /// Update a section and replace all of its values in one transaction.
    ///
    /// Returns `None` (and changes nothing) if the section does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &AboutSectionInput,
    ) -> Result<Option<AboutSectionWithValues>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE about_sections SET
                entity_type = $2,
                title = $3,
                description = $4,
                image_url = $5,
                vision = $6,
                mission = $7,
                order_index = $8,
                is_active = $9,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let section = sqlx::query_as::<_, AboutSection>(&query)
            .bind(id)
            .bind(input.entity_type.as_str())
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(&input.vision)
            .bind(&input.mission)
            .bind(input.order_index)
            .bind(input.is_active)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(section) = section else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("DELETE FROM about_values WHERE about_section_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let values = Self::insert_values(&mut *tx, id, &input.values).await?;

        tx.commit().await?;
        Ok(Some(AboutSectionWithValues { section, values }))
    }

    /// Delete a section; its values go with it (`ON DELETE CASCADE`).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM about_sections WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Values of one section, ordered by `order_index` then `id`.
    pub async fn values_for(
        pool: &PgPool,
        section_id: DbId,
    ) -> Result<Vec<AboutValue>, sqlx::Error> {
        let query = format!(
            "SELECT {VALUE_COLUMNS} FROM about_values
             WHERE about_section_id = $1
             ORDER BY order_index ASC, id ASC"
        );
        sqlx::query_as::<_, AboutValue>(&query)
            .bind(section_id)
            .fetch_all(pool)
            .await
    }

    async fn insert_values(
        conn: &mut PgConnection,
        section_id: DbId,
        inputs: &[AboutValueInput],
    ) -> Result<Vec<AboutValue>, sqlx::Error> {
        let query = format!(
            "INSERT INTO about_values (about_section_id, title, description, icon, order_index)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {VALUE_COLUMNS}"
        );
        let mut values = Vec::with_capacity(inputs.len());
        for input in inputs {
            let value = sqlx::query_as::<_, AboutValue>(&query)
                .bind(section_id)
                .bind(&input.title)
                .bind(&input.description)
                .bind(&input.icon)
                .bind(input.order_index)
                .fetch_one(&mut *conn)
                .await?;
            values.push(value);
        }
        // Returned in insertion order; callers expect display order.
        values.sort_by_key(|v| (v.order_index, v.id));
        Ok(values)
    }

    async fn attach_values(
        pool: &PgPool,
        sections: Vec<AboutSection>,
    ) -> Result<Vec<AboutSectionWithValues>, sqlx::Error> {
        if sections.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<DbId> = sections.iter().map(|s| s.id).collect();
        let query = format!(
            "SELECT {VALUE_COLUMNS} FROM about_values
             WHERE about_section_id = ANY($1)
             ORDER BY order_index ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, AboutValue>(&query)
            .bind(&ids)
            .fetch_all(pool)
            .await?;

        let mut by_section: HashMap<DbId, Vec<AboutValue>> = HashMap::new();
        for value in rows {
            by_section.entry(value.about_section_id).or_default().push(value);
        }
        Ok(sections
            .into_iter()
            .map(|section| {
                let values = by_section.remove(&section.id).unwrap_or_default();
                AboutSectionWithValues { section, values }
            })
            .collect())
    }
}
