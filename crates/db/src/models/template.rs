//! Row model for the `templates` table.

use serde::Serialize;
use sqlx::FromRow;
use invite_core::error::CoreError;
use invite_core::store::Template;
use invite_core::types::{DbId, Timestamp};

/// A template row from the `templates` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TemplateRow {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub base_config: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<TemplateRow> for Template {
    type Error = CoreError;

    /// Fails only when `base_config` is not a JSON object. Mistyped fields
    /// inside it are dropped and section data of any shape is accepted.
    fn try_from(row: TemplateRow) -> Result<Self, Self::Error> {
        let base_config = serde_json::from_value(row.base_config).map_err(|e| {
            CoreError::Internal(format!(
                "Template {} has an unreadable base_config: {e}",
                row.id
            ))
        })?;
        Ok(Template {
            id: row.id,
            slug: row.slug,
            name: row.name,
            description: row.description,
            base_config,
        })
    }
}
