//! Repository for the `templates` table.

use sqlx::PgPool;
use invite_core::store::NewTemplate;
use invite_core::types::DbId;

use crate::models::template::TemplateRow;

/// Column list for templates queries.
const COLUMNS: &str = "id, slug, name, description, base_config, created_at, updated_at";

/// Provides read and insert operations for the template catalog.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template, returning the created row.
    ///
    /// The base configuration is bound as JSON text so key order survives.
    pub async fn create(pool: &PgPool, input: &NewTemplate) -> Result<TemplateRow, sqlx::Error> {
        let base_config = serde_json::to_string(&input.base_config)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let query = format!(
            "INSERT INTO templates (slug, name, description, base_config)
             VALUES ($1, $2, $3, $4::json)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TemplateRow>(&query)
            .bind(&input.slug)
            .bind(&input.name)
            .bind(&input.description)
            .bind(base_config)
            .fetch_one(pool)
            .await
    }

    /// Find a template by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TemplateRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1");
        sqlx::query_as::<_, TemplateRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all templates, alphabetically by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<TemplateRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates ORDER BY name ASC, id ASC");
        sqlx::query_as::<_, TemplateRow>(&query)
            .fetch_all(pool)
            .await
    }
}
