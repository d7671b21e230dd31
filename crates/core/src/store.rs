//! Collaborator interfaces for the template catalog and page persistence,
//! plus an in-memory implementation of both.
//!
//! Only the customization and content are ever persisted; the resolved
//! configuration is always recomputed so template updates keep applying.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use validator::Validate;

use crate::config::Customization;
use crate::error::CoreError;
use crate::types::{DbId, PageContent, Timestamp};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A catalog template: a named, reusable base configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub base_config: Customization,
}

/// Maximum length of a template slug.
pub const MAX_TEMPLATE_SLUG_LEN: usize = 100;

/// Maximum length of a template name.
pub const MAX_TEMPLATE_NAME_LEN: usize = 200;

/// Maximum length of a template description.
pub const MAX_TEMPLATE_DESCRIPTION_LEN: usize = 5000;

/// Input for registering a template in the catalog.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    #[validate(length(min = 1, max = 100))]
    pub slug: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default)]
    pub base_config: Customization,
}

impl NewTemplate {
    /// Check field lengths and that the slug is lowercase ASCII letters,
    /// digits and hyphens.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        let valid_slug = self
            .slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_slug {
            return Err(CoreError::Validation(format!(
                "Invalid template slug '{}'. Use lowercase letters, digits and hyphens",
                self.slug
            )));
        }
        Ok(())
    }
}

/// A page instance as persisted: the template it starts from plus the
/// user's customization and content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPage {
    pub id: DbId,
    pub template_id: DbId,
    pub customization: Customization,
    pub content: PageContent,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Source of base templates.
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    async fn list_templates(&self) -> Result<Vec<Template>, CoreError>;

    async fn get_template(&self, id: DbId) -> Result<Option<Template>, CoreError>;

    async fn create_template(&self, input: &NewTemplate) -> Result<Template, CoreError>;
}

/// Storage for page customizations and content.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Create an empty page bound to `template_id`.
    async fn create_page(&self, template_id: DbId) -> Result<SavedPage, CoreError>;

    async fn load_page(&self, id: DbId) -> Result<Option<SavedPage>, CoreError>;

    /// Persist the customization and content verbatim.
    async fn save_page(
        &self,
        id: DbId,
        template_id: DbId,
        customization: &Customization,
        content: &PageContent,
    ) -> Result<SavedPage, CoreError>;

    /// Check the backing storage is reachable.
    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// Process-local catalog and page store. Used by tests and local runs.
#[derive(Debug)]
pub struct InMemoryStore {
    templates: RwLock<BTreeMap<DbId, Template>>,
    pages: RwLock<BTreeMap<DbId, SavedPage>>,
    next_template_id: AtomicI64,
    next_page_id: AtomicI64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            templates: RwLock::new(BTreeMap::new()),
            pages: RwLock::new(BTreeMap::new()),
            next_template_id: AtomicI64::new(1),
            next_page_id: AtomicI64::new(1),
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TemplateCatalog for InMemoryStore {
    async fn list_templates(&self) -> Result<Vec<Template>, CoreError> {
        Ok(self.templates.read().await.values().cloned().collect())
    }

    async fn get_template(&self, id: DbId) -> Result<Option<Template>, CoreError> {
        Ok(self.templates.read().await.get(&id).cloned())
    }

    async fn create_template(&self, input: &NewTemplate) -> Result<Template, CoreError> {
        let mut templates = self.templates.write().await;
        if templates.values().any(|t| t.slug == input.slug) {
            return Err(CoreError::Conflict(format!(
                "Template slug '{}' already exists",
                input.slug
            )));
        }
        let template = Template {
            id: self.next_template_id.fetch_add(1, Ordering::Relaxed),
            slug: input.slug.clone(),
            name: input.name.clone(),
            description: input.description.clone(),
            base_config: input.base_config.clone(),
        };
        templates.insert(template.id, template.clone());
        Ok(template)
    }
}

#[async_trait]
impl PageStore for InMemoryStore {
    async fn create_page(&self, template_id: DbId) -> Result<SavedPage, CoreError> {
        let page = SavedPage {
            id: self.next_page_id.fetch_add(1, Ordering::Relaxed),
            template_id,
            customization: Customization::default(),
            content: PageContent::Object(Default::default()),
            updated_at: chrono::Utc::now(),
        };
        self.pages.write().await.insert(page.id, page.clone());
        Ok(page)
    }

    async fn load_page(&self, id: DbId) -> Result<Option<SavedPage>, CoreError> {
        Ok(self.pages.read().await.get(&id).cloned())
    }

    async fn save_page(
        &self,
        id: DbId,
        template_id: DbId,
        customization: &Customization,
        content: &PageContent,
    ) -> Result<SavedPage, CoreError> {
        let mut pages = self.pages.write().await;
        let page = pages
            .get_mut(&id)
            .ok_or(CoreError::NotFound { entity: "Page", id })?;
        page.template_id = template_id;
        page.customization = customization.clone();
        page.content = content.clone();
        page.updated_at = chrono::Utc::now();
        Ok(page.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
