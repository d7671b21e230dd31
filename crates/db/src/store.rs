//! [`PgStore`]: the Postgres-backed template catalog and page store.

use async_trait::async_trait;
use invite_core::config::Customization;
use invite_core::error::CoreError;
use invite_core::store::{NewTemplate, PageStore, SavedPage, Template, TemplateCatalog};
use invite_core::types::{DbId, PageContent};

use crate::error::classify_sqlx_error;
use crate::models::template::TemplateRow;
use crate::repositories::{PageRepo, TemplateRepo};
use crate::DbPool;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateCatalog for PgStore {
    async fn list_templates(&self) -> Result<Vec<Template>, CoreError> {
        let rows = TemplateRepo::list(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(readable_templates(rows))
    }

    async fn get_template(&self, id: DbId) -> Result<Option<Template>, CoreError> {
        TemplateRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)?
            .map(Template::try_from)
            .transpose()
    }

    async fn create_template(&self, input: &NewTemplate) -> Result<Template, CoreError> {
        let row = TemplateRepo::create(&self.pool, input)
            .await
            .map_err(classify_sqlx_error)?;
        tracing::info!(template_id = row.id, slug = %row.slug, "Template created");
        Template::try_from(row)
    }
}

#[async_trait]
impl PageStore for PgStore {
    async fn create_page(&self, template_id: DbId) -> Result<SavedPage, CoreError> {
        let row = PageRepo::create(&self.pool, template_id)
            .await
            .map_err(classify_sqlx_error)?;
        SavedPage::try_from(row)
    }

    async fn load_page(&self, id: DbId) -> Result<Option<SavedPage>, CoreError> {
        PageRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)?
            .map(SavedPage::try_from)
            .transpose()
    }

    async fn save_page(
        &self,
        id: DbId,
        template_id: DbId,
        customization: &Customization,
        content: &PageContent,
    ) -> Result<SavedPage, CoreError> {
        let customization = serde_json::to_value(customization)
            .map_err(|e| CoreError::Internal(format!("Failed to encode customization: {e}")))?;
        let row = PageRepo::save(&self.pool, id, template_id, &customization, content)
            .await
            .map_err(classify_sqlx_error)?
            .ok_or(CoreError::NotFound { entity: "Page", id })?;
        tracing::debug!(page_id = id, template_id, "Page saved");
        SavedPage::try_from(row)
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(classify_sqlx_error)
    }
}

/// Convert catalog rows, skipping and logging any that cannot be read.
fn readable_templates(rows: Vec<TemplateRow>) -> Vec<Template> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match Template::try_from(row) {
                Ok(template) => Some(template),
                Err(e) => {
                    tracing::warn!(template_id = id, error = %e, "Skipping unreadable template");
                    None
                }
            }
        })
        .collect()
}
