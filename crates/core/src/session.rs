//! Editor session: the live customization and content for one page, the
//! preview derived from them, and the undo/redo history of commit points.
//!
//! Saving is split in two so an owner can release its lock while the store
//! call is in flight: [`EditorSession::begin_save`] takes the in-flight flag
//! and snapshots what to persist, [`EditorSession::finish_save`] clears the
//! flag and records the outcome. A second save while one is outstanding is
//! refused rather than queued.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{Customization, TemplateConfig};
use crate::error::CoreError;
use crate::history::{EditingHistory, HistoryEntry};
use crate::merge::merge;
use crate::section::SectionDescriptor;
use crate::selector::select;
use crate::store::{PageStore, SavedPage, Template};
use crate::types::{DbId, PageContent};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveError {
    #[error("A save is already in progress")]
    InFlight,

    #[error("Save failed: {reason}")]
    Failed { reason: String },
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

/// What the renderer receives: the resolved configuration, the ordered
/// visible sections and the CSS custom properties to apply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub config: TemplateConfig,
    pub sections: Vec<SectionDescriptor>,
    pub css_variables: Map<String, Value>,
}

impl Preview {
    pub fn resolve(template: &Template, customization: &Customization) -> Self {
        let config = merge(Some(&template.base_config), customization);
        let sections = select(&config).into_iter().cloned().collect();
        let css_variables = config
            .css_variables()
            .into_iter()
            .map(|(name, value)| (name, Value::String(value)))
            .collect();
        Self {
            config,
            sections,
            css_variables,
        }
    }
}

// ---------------------------------------------------------------------------
// Save tickets
// ---------------------------------------------------------------------------

/// State captured when a save starts.
#[derive(Debug, Clone)]
pub struct SaveTicket {
    pub page_id: DbId,
    pub template_id: DbId,
    pub customization: Customization,
    pub content: PageContent,
}

/// The last state known to be persisted.
#[derive(Debug, Clone, PartialEq)]
struct SavedState {
    template_id: DbId,
    customization: Customization,
    content: PageContent,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct EditorSession {
    page_id: DbId,
    template: Template,
    customization: Customization,
    content: PageContent,
    history: EditingHistory,
    saved: SavedState,
    saving: bool,
}

impl EditorSession {
    /// Start editing a page from scratch on `template`.
    pub fn new(page_id: DbId, template: Template) -> Self {
        Self::resume(page_id, template, Customization::default(), empty_content())
    }

    /// Resume editing with previously saved state. The loaded state becomes
    /// the first history entry and counts as saved.
    pub fn resume(
        page_id: DbId,
        template: Template,
        customization: Customization,
        content: PageContent,
    ) -> Self {
        let saved = SavedState {
            template_id: template.id,
            customization: customization.clone(),
            content: content.clone(),
        };
        let mut session = Self {
            page_id,
            template,
            customization,
            content,
            history: EditingHistory::new(),
            saved,
            saving: false,
        };
        session.history.commit(&session.customization, &session.content);
        session
    }

    /// Resume from a stored page record.
    pub fn from_saved(page: SavedPage, template: Template) -> Self {
        Self::resume(page.id, template, page.customization, page.content)
    }

    pub fn page_id(&self) -> DbId {
        self.page_id
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn customization(&self) -> &Customization {
        &self.customization
    }

    pub fn content(&self) -> &PageContent {
        &self.content
    }

    pub fn history(&self) -> &EditingHistory {
        &self.history
    }

    // -- Live edits --

    /// Overlay a customization fragment onto the live state. Not a commit
    /// point: call [`checkpoint`](Self::checkpoint) when the edit completes.
    pub fn apply(&mut self, fragment: Customization) {
        self.customization.overlay(fragment);
    }

    /// Shallow-merge a content fragment into the live content.
    pub fn apply_content(&mut self, fragment: Map<String, Value>) {
        match &mut self.content {
            Value::Object(current) => current.extend(fragment),
            other => *other = Value::Object(fragment),
        }
    }

    /// Record the live state as a history entry. Returns `false` (and records
    /// nothing) when the state equals the entry the history is on.
    pub fn checkpoint(&mut self) -> bool {
        if let Some(current) = self.history.current() {
            if current.customization == self.customization && current.content == self.content {
                return false;
            }
        }
        self.history.commit(&self.customization, &self.content);
        true
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(entry) => {
                restore(&mut self.customization, &mut self.content, entry);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(entry) => {
                restore(&mut self.customization, &mut self.content, entry);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Switch to a different base template. Customization, content and
    /// history are discarded: they only make sense against one template.
    pub fn switch_template(&mut self, template: Template) {
        tracing::debug!(
            page_id = self.page_id,
            from = self.template.id,
            to = template.id,
            "Switching template, clearing editor state"
        );
        self.template = template;
        self.customization = Customization::default();
        self.content = empty_content();
        self.history.reset();
        self.history.commit(&self.customization, &self.content);
    }

    // -- Preview --

    pub fn resolved(&self) -> TemplateConfig {
        merge(Some(&self.template.base_config), &self.customization)
    }

    pub fn preview(&self) -> Preview {
        Preview::resolve(&self.template, &self.customization)
    }

    // -- Saving --

    /// Whether the live state differs from the last persisted one. Undoing
    /// back to the saved state clears the indicator.
    pub fn has_unsaved_changes(&self) -> bool {
        self.template.id != self.saved.template_id
            || self.customization != self.saved.customization
            || self.content != self.saved.content
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Take the in-flight flag and snapshot what to persist.
    pub fn begin_save(&mut self) -> Result<SaveTicket, SaveError> {
        if self.saving {
            return Err(SaveError::InFlight);
        }
        self.saving = true;
        Ok(SaveTicket {
            page_id: self.page_id,
            template_id: self.template.id,
            customization: self.customization.clone(),
            content: self.content.clone(),
        })
    }

    /// Clear the in-flight flag and record the outcome of a save.
    ///
    /// On success the ticket's state becomes the saved state, so edits made
    /// after the ticket was taken stay unsaved. On failure nothing but the flag
    /// changes, so the user can retry.
    pub fn finish_save(
        &mut self,
        ticket: &SaveTicket,
        result: Result<(), CoreError>,
    ) -> Result<(), SaveError> {
        self.saving = false;
        match result {
            Ok(()) => {
                self.saved = SavedState {
                    template_id: ticket.template_id,
                    customization: ticket.customization.clone(),
                    content: ticket.content.clone(),
                };
                Ok(())
            }
            Err(e) => {
                tracing::warn!(page_id = self.page_id, error = %e, "Page save failed");
                Err(SaveError::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Persist through `store` in one call. Convenience for owners that hold
    /// the session exclusively for the duration of the save.
    pub async fn save(&mut self, store: &dyn PageStore) -> Result<(), SaveError> {
        let ticket = self.begin_save()?;
        let result = store
            .save_page(
                ticket.page_id,
                ticket.template_id,
                &ticket.customization,
                &ticket.content,
            )
            .await
            .map(|_| ());
        self.finish_save(&ticket, result)
    }
}

fn restore(customization: &mut Customization, content: &mut PageContent, entry: &HistoryEntry) {
    *customization = entry.customization.clone();
    *content = entry.content.clone();
}

fn empty_content() -> PageContent {
    Value::Object(Map::new())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, NewTemplate, TemplateCatalog};
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use serde_json::json;

    fn template(id: DbId, base: Value) -> Template {
        Template {
            id,
            slug: format!("t{id}"),
            name: format!("Template {id}"),
            description: None,
            base_config: serde_json::from_value(base).unwrap(),
        }
    }

    fn garden() -> Template {
        template(
            1,
            json!({
                "colors": { "primary": "#2f4f2f", "secondary": "#c9b037" },
                "sections": {
                    "hero": { "title": "Together" },
                    "story": { "enabled": false },
                    "rsvp": {}
                }
            }),
        )
    }

    fn fragment(value: Value) -> Customization {
        serde_json::from_value(value).unwrap()
    }

    fn content_obj(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    struct FailingStore;

    #[async_trait]
    impl PageStore for FailingStore {
        async fn create_page(&self, _template_id: DbId) -> Result<SavedPage, CoreError> {
            Err(CoreError::Storage("unavailable".into()))
        }

        async fn load_page(&self, _id: DbId) -> Result<Option<SavedPage>, CoreError> {
            Err(CoreError::Storage("unavailable".into()))
        }

        async fn save_page(
            &self,
            _id: DbId,
            _template_id: DbId,
            _customization: &Customization,
            _content: &PageContent,
        ) -> Result<SavedPage, CoreError> {
            Err(CoreError::Storage("disk full".into()))
        }
    }

    // -- Lifecycle --

    #[test]
    fn new_session_starts_clean_with_one_entry() {
        let session = EditorSession::new(10, garden());
        assert!(session.customization().is_empty());
        assert_eq!(session.content(), &json!({}));
        assert_eq!(session.history().len(), 1);
        assert!(!session.can_undo());
        assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn preview_resolves_template_and_selects_visible() {
        let session = EditorSession::new(10, garden());
        let preview = session.preview();
        assert_eq!(preview.config.colors.primary, "#2f4f2f");
        let ids: Vec<_> = preview.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["hero", "rsvp"]);
        assert_eq!(preview.config.sections.len(), 3);
    }

    #[test]
    fn preview_carries_css_variables_for_live_edits() {
        let mut session = EditorSession::new(10, garden());
        session.apply(fragment(json!({ "colors": { "primary": "#000" } })));
        let preview = session.preview();
        assert_eq!(preview.css_variables["--color-primary"], "#000");
        assert_eq!(preview.css_variables["--color-secondary"], "#c9b037");

        let wire = serde_json::to_value(&preview).unwrap();
        assert_eq!(wire["cssVariables"]["--color-primary"], "#000");
    }

    #[test]
    fn edits_update_preview_without_committing() {
        let mut session = EditorSession::new(10, garden());
        session.apply(fragment(json!({ "colors": { "primary": "#000" } })));
        session.apply(fragment(json!({ "sections": [{ "id": "story", "isVisible": true }] })));

        let preview = session.preview();
        assert_eq!(preview.config.colors.primary, "#000");
        assert_eq!(preview.config.colors.secondary, "#c9b037");
        assert_eq!(preview.sections.len(), 3);
        assert_eq!(session.history().len(), 1);
        assert!(session.has_unsaved_changes());
    }

    // -- History --

    #[test]
    fn checkpoint_then_undo_restores_previous_state() {
        let mut session = EditorSession::new(10, garden());
        session.apply(fragment(json!({ "colors": { "primary": "#000" } })));
        session.apply_content(content_obj(json!({ "groom": "Ben" })));
        assert!(session.checkpoint());

        assert!(session.undo());
        assert!(session.customization().is_empty());
        assert_eq!(session.content(), &json!({}));
        assert!(session.can_redo());

        assert!(session.redo());
        assert_eq!(session.resolved().colors.primary, "#000");
        assert_eq!(session.content()["groom"], "Ben");
        assert!(!session.redo());
    }

    #[test]
    fn unchanged_checkpoint_is_skipped() {
        let mut session = EditorSession::new(10, garden());
        assert!(!session.checkpoint());
        session.apply(fragment(json!({ "layout": { "maxWidth": "800px" } })));
        assert!(session.checkpoint());
        assert!(!session.checkpoint());
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn undo_back_to_saved_state_clears_unsaved_changes() {
        let mut session = EditorSession::new(10, garden());
        session.apply(fragment(json!({ "colors": { "primary": "#000" } })));
        assert!(session.checkpoint());
        assert!(session.has_unsaved_changes());

        assert!(session.undo());
        assert!(!session.has_unsaved_changes());

        assert!(session.redo());
        assert!(session.has_unsaved_changes());
    }

    #[test]
    fn undo_past_a_save_marks_unsaved() {
        let mut session = EditorSession::new(10, garden());
        session.apply(fragment(json!({ "colors": { "primary": "#000" } })));
        session.checkpoint();
        let ticket = session.begin_save().unwrap();
        session.finish_save(&ticket, Ok(())).unwrap();
        assert!(!session.has_unsaved_changes());

        assert!(session.undo());
        assert!(session.has_unsaved_changes());
        assert!(session.redo());
        assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn undo_at_start_is_a_no_op() {
        let mut session = EditorSession::new(10, garden());
        session.apply(fragment(json!({ "colors": { "text": "#123" } })));
        assert!(!session.undo());
        assert_eq!(session.resolved().colors.text, "#123");
    }

    #[test]
    fn switching_template_clears_state_and_history() {
        let mut session = EditorSession::new(10, garden());
        session.apply(fragment(json!({ "colors": { "primary": "#000" } })));
        session.checkpoint();

        session.switch_template(template(2, json!({ "colors": { "primary": "#abc" } })));
        assert_eq!(session.template().id, 2);
        assert!(session.customization().is_empty());
        assert_eq!(session.history().len(), 1);
        assert!(!session.can_undo());
        assert_eq!(session.resolved().colors.primary, "#abc");
    }

    #[test]
    fn non_object_content_is_replaced_by_fragment() {
        let mut session =
            EditorSession::resume(10, garden(), Customization::default(), json!("legacy"));
        session.apply_content(content_obj(json!({ "venue": "Hall" })));
        assert_eq!(session.content(), &json!({ "venue": "Hall" }));
    }

    // -- Saving --

    #[test]
    fn second_save_while_in_flight_is_refused() {
        let mut session = EditorSession::new(10, garden());
        let ticket = session.begin_save().unwrap();
        assert!(session.is_saving());
        assert_matches!(session.begin_save(), Err(SaveError::InFlight));

        session.finish_save(&ticket, Ok(())).unwrap();
        assert!(!session.is_saving());
        assert!(session.begin_save().is_ok());
    }

    #[test]
    fn edits_during_save_stay_unsaved() {
        let mut session = EditorSession::new(10, garden());
        session.apply(fragment(json!({ "colors": { "primary": "#000" } })));
        let ticket = session.begin_save().unwrap();
        session.apply(fragment(json!({ "colors": { "primary": "#111" } })));

        session.finish_save(&ticket, Ok(())).unwrap();
        assert!(session.has_unsaved_changes());
        assert_eq!(
            ticket.customization.colors.as_ref().unwrap().primary.as_deref(),
            Some("#000")
        );
    }

    #[tokio::test]
    async fn save_persists_customization_not_resolved_config() {
        let store = InMemoryStore::new();
        let template = store
            .create_template(&NewTemplate {
                slug: "garden".into(),
                name: "Garden".into(),
                description: None,
                base_config: garden().base_config,
            })
            .await
            .unwrap();
        let page = store.create_page(template.id).await.unwrap();

        let mut session = EditorSession::from_saved(page, template);
        session.apply(fragment(json!({ "colors": { "accent": "#eee" } })));
        session.save(&store).await.unwrap();
        assert!(!session.has_unsaved_changes());

        let loaded = store.load_page(session.page_id()).await.unwrap().unwrap();
        assert_eq!(loaded.customization, *session.customization());
        assert!(loaded.customization.colors.unwrap().primary.is_none());
    }

    #[tokio::test]
    async fn failed_save_keeps_state_and_allows_retry() {
        let mut session = EditorSession::new(10, garden());
        session.apply(fragment(json!({ "colors": { "primary": "#000" } })));
        session.checkpoint();
        let before = session.customization().clone();

        let result = session.save(&FailingStore).await;
        assert_matches!(result, Err(SaveError::Failed { ref reason }) if reason.contains("disk full"));
        assert!(!session.is_saving());
        assert!(session.has_unsaved_changes());
        assert_eq!(session.customization(), &before);
        assert_eq!(session.history().len(), 2);

        let store = InMemoryStore::new();
        let page = store.create_page(1).await.unwrap();
        let mut retry = EditorSession::resume(page.id, garden(), before, json!({}));
        assert!(retry.save(&store).await.is_ok());
    }
}
