use std::sync::Arc;
use std::time::Duration;

use invite_core::store::{PageStore, TemplateCatalog};

use crate::config::ServerConfig;
use crate::sessions::SessionManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Source of base templates.
    pub catalog: Arc<dyn TemplateCatalog>,
    /// Page persistence.
    pub store: Arc<dyn PageStore>,
    /// Open editor sessions.
    pub sessions: Arc<SessionManager>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn TemplateCatalog>,
        store: Arc<dyn PageStore>,
        config: ServerConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            sessions: Arc::new(SessionManager::new(
                config.max_editor_sessions,
                Duration::from_secs(config.session_idle_timeout_secs),
            )),
            config: Arc::new(config),
        }
    }
}
