//! Row model for the `pages` table.

use serde::Serialize;
use sqlx::FromRow;
use invite_core::error::CoreError;
use invite_core::store::SavedPage;
use invite_core::types::{DbId, Timestamp};

/// A page row from the `pages` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PageRow {
    pub id: DbId,
    pub template_id: DbId,
    pub customization: serde_json::Value,
    pub content: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<PageRow> for SavedPage {
    type Error = CoreError;

    fn try_from(row: PageRow) -> Result<Self, Self::Error> {
        let customization = serde_json::from_value(row.customization).map_err(|e| {
            CoreError::Internal(format!(
                "Page {} has an unreadable customization: {e}",
                row.id
            ))
        })?;
        Ok(SavedPage {
            id: row.id,
            template_id: row.template_id,
            customization,
            content: row.content,
            updated_at: row.updated_at,
        })
    }
}
