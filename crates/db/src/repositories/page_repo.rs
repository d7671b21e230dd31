//! Repository for the `pages` table.

use sqlx::PgPool;
use invite_core::types::DbId;

use crate::models::page::PageRow;

/// Column list for pages queries.
const COLUMNS: &str = "id, template_id, customization, content, created_at, updated_at";

/// Provides create, load and save operations for page instances.
pub struct PageRepo;

impl PageRepo {
    /// Insert an empty page bound to a template, returning the created row.
    pub async fn create(pool: &PgPool, template_id: DbId) -> Result<PageRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO pages (template_id)
             VALUES ($1)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PageRow>(&query)
            .bind(template_id)
            .fetch_one(pool)
            .await
    }

    /// Find a page by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PageRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pages WHERE id = $1");
        sqlx::query_as::<_, PageRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite a page's template, customization and content.
    ///
    /// The customization is bound as JSON text so key order survives.
    /// Returns `None` if no page with the given `id` exists.
    pub async fn save(
        pool: &PgPool,
        id: DbId,
        template_id: DbId,
        customization: &serde_json::Value,
        content: &serde_json::Value,
    ) -> Result<Option<PageRow>, sqlx::Error> {
        let query = format!(
            "UPDATE pages SET
                template_id = $2,
                customization = $3::json,
                content = $4,
                updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PageRow>(&query)
            .bind(id)
            .bind(template_id)
            .bind(customization.to_string())
            .bind(content)
            .fetch_optional(pool)
            .await
    }
}
