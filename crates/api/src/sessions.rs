//! Registry of open editor sessions.
//!
//! Each session is owned by the registry and reached by its UUID. Handlers
//! borrow a session for the duration of a closure and never hold the lock
//! across an `.await`. Saving releases the lock while the store call is in
//! flight; the store call and the bookkeeping after it run on a spawned task
//! so a dropped request cannot leave the session stuck in the saving state.
//!
//! Sessions untouched for longer than the idle timeout are evicted by a
//! periodic sweep (see [`start_idle_sweep`]) and, when the registry is full,
//! before a new session is refused.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use invite_core::config::Customization;
use invite_core::error::CoreError;
use invite_core::session::{EditorSession, Preview, SaveError};
use invite_core::store::PageStore;
use invite_core::types::{DbId, PageContent};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Interval between idle-session sweeps.
const IDLE_SWEEP_INTERVAL_SECS: u64 = 60;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

struct Entry {
    session: EditorSession,
    last_active: Instant,
}

impl Entry {
    fn is_idle(&self, now: Instant, idle_timeout: Duration) -> bool {
        !self.session.is_saving() && now.duration_since(self.last_active) >= idle_timeout
    }
}

type SessionMap = HashMap<Uuid, Entry>;

/// Bounded map of open editor sessions.
///
/// Thread-safe via interior `RwLock`; wrapped in `Arc` inside `AppState`.
pub struct SessionManager {
    sessions: Arc<RwLock<SessionMap>>,
    limit: usize,
    idle_timeout: Duration,
}

impl SessionManager {
    pub fn new(limit: usize, idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            limit,
            idle_timeout,
        }
    }

    /// Register a session, returning its new id. Idle sessions are evicted
    /// first when the registry is full.
    pub async fn open(&self, session: EditorSession) -> AppResult<Uuid> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.limit {
            evict_idle(&mut sessions, self.idle_timeout);
        }
        if sessions.len() >= self.limit {
            tracing::warn!(limit = self.limit, "Editor session limit reached");
            return Err(AppError::SessionLimit(self.limit));
        }
        let id = Uuid::new_v4();
        tracing::info!(
            session_id = %id,
            page_id = session.page_id(),
            template_id = session.template().id,
            "Editor session opened"
        );
        sessions.insert(
            id,
            Entry {
                session,
                last_active: Instant::now(),
            },
        );
        Ok(id)
    }

    /// Run `f` against a shared borrow of the session. Counts as activity.
    pub async fn with<R>(&self, id: Uuid, f: impl FnOnce(&EditorSession) -> R) -> AppResult<R> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id).ok_or(AppError::SessionNotFound(id))?;
        entry.last_active = Instant::now();
        Ok(f(&entry.session))
    }

    /// Run `f` against an exclusive borrow of the session.
    pub async fn with_mut<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut EditorSession) -> R,
    ) -> AppResult<R> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id).ok_or(AppError::SessionNotFound(id))?;
        entry.last_active = Instant::now();
        Ok(f(&mut entry.session))
    }

    /// Remove a session, returning it.
    pub async fn close(&self, id: Uuid) -> AppResult<EditorSession> {
        let entry = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or(AppError::SessionNotFound(id))?;
        let session = entry.session;
        if session.has_unsaved_changes() {
            tracing::info!(session_id = %id, page_id = session.page_id(), "Closing session with unsaved changes");
        }
        Ok(session)
    }

    /// Persist the session's current customization and content.
    ///
    /// Refused with [`SaveError::InFlight`] while another save for the same
    /// session is outstanding. Once started, the save runs to completion
    /// even if the caller stops waiting for it.
    pub async fn save(&self, id: Uuid, store: Arc<dyn PageStore>) -> AppResult<()> {
        let ticket = self.with_mut(id, |session| session.begin_save()).await??;
        let page_id = ticket.page_id;

        let sessions = Arc::clone(&self.sessions);
        let task_ticket = ticket.clone();
        let task = tokio::spawn(async move {
            let ticket = task_ticket;
            let result = store
                .save_page(
                    ticket.page_id,
                    ticket.template_id,
                    &ticket.customization,
                    &ticket.content,
                )
                .await
                .map(|_| ());

            let mut sessions = sessions.write().await;
            match sessions.get_mut(&id) {
                Some(entry) => {
                    entry.last_active = Instant::now();
                    entry.session.finish_save(&ticket, result)
                }
                None => {
                    tracing::debug!(session_id = %id, "Session closed while saving");
                    result.map_err(|e| SaveError::Failed {
                        reason: e.to_string(),
                    })
                }
            }
        });

        match task.await {
            Ok(outcome) => outcome?,
            Err(e) => {
                tracing::error!(session_id = %id, error = %e, "Save task failed");
                let failure = Err(CoreError::Internal(e.to_string()));
                if let Some(entry) = self.sessions.write().await.get_mut(&id) {
                    // The flag is cleared; the failure itself is reported below.
                    let _ = entry.session.finish_save(&ticket, failure);
                }
                return Err(AppError::InternalError(format!("Save task failed: {e}")));
            }
        }
        tracing::info!(session_id = %id, page_id, "Page saved from editor session");
        Ok(())
    }

    /// Evict every session idle for at least the idle timeout. Sessions
    /// with a save in flight are kept. Returns how many were evicted.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        evict_idle(&mut sessions, self.idle_timeout)
    }

    /// Number of open sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

fn evict_idle(sessions: &mut SessionMap, idle_timeout: Duration) -> usize {
    let now = Instant::now();
    let before = sessions.len();
    sessions.retain(|id, entry| {
        let idle = entry.is_idle(now, idle_timeout);
        if idle {
            tracing::info!(
                session_id = %id,
                page_id = entry.session.page_id(),
                unsaved_changes = entry.session.has_unsaved_changes(),
                "Evicting idle editor session"
            );
        }
        !idle
    });
    before - sessions.len()
}

/// Start a background task that periodically evicts idle sessions.
///
/// Returns a `JoinHandle` that can be used to abort the task on shutdown.
pub fn start_idle_sweep(sessions: Arc<SessionManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(IDLE_SWEEP_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let evicted = sessions.evict_idle().await;
            if evicted > 0 {
                let remaining = sessions.len().await;
                tracing::debug!(evicted, remaining, "Idle session sweep");
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Wire representation of an editor session and its live preview.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub page_id: DbId,
    pub template_id: DbId,
    pub customization: Customization,
    pub content: PageContent,
    pub preview: Preview,
    pub can_undo: bool,
    pub can_redo: bool,
    pub history_len: usize,
    pub unsaved_changes: bool,
    pub saving: bool,
}

impl SessionView {
    pub fn of(id: Uuid, session: &EditorSession) -> Self {
        Self {
            id,
            page_id: session.page_id(),
            template_id: session.template().id,
            customization: session.customization().clone(),
            content: session.content().clone(),
            preview: session.preview(),
            can_undo: session.can_undo(),
            can_redo: session.can_redo(),
            history_len: session.history().len(),
            unsaved_changes: session.has_unsaved_changes(),
            saving: session.is_saving(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use invite_core::store::{InMemoryStore, SavedPage, Template};

    const HOUR: Duration = Duration::from_secs(3600);

    fn template() -> Template {
        Template {
            id: 1,
            slug: "garden".into(),
            name: "Garden".into(),
            description: None,
            base_config: Customization::default(),
        }
    }

    /// Delegates to an in-memory store after a fixed delay.
    struct SlowStore {
        inner: InMemoryStore,
        delay: Duration,
    }

    #[async_trait]
    impl PageStore for SlowStore {
        async fn create_page(&self, template_id: DbId) -> Result<SavedPage, CoreError> {
            self.inner.create_page(template_id).await
        }

        async fn load_page(&self, id: DbId) -> Result<Option<SavedPage>, CoreError> {
            self.inner.load_page(id).await
        }

        async fn save_page(
            &self,
            id: DbId,
            template_id: DbId,
            customization: &Customization,
            content: &PageContent,
        ) -> Result<SavedPage, CoreError> {
            tokio::time::sleep(self.delay).await;
            self.inner
                .save_page(id, template_id, customization, content)
                .await
        }
    }

    fn bride(name: &str) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from_iter([("bride".to_string(), serde_json::json!(name))])
    }

    #[tokio::test]
    async fn open_respects_limit() {
        let manager = SessionManager::new(1, HOUR);
        manager.open(EditorSession::new(1, template())).await.unwrap();
        let result = manager.open(EditorSession::new(2, template())).await;
        assert_matches!(result, Err(AppError::SessionLimit(1)));
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let manager = SessionManager::new(4, HOUR);
        let id = Uuid::new_v4();
        assert_matches!(manager.with(id, |_| ()).await, Err(AppError::SessionNotFound(_)));
        assert_matches!(manager.close(id).await, Err(AppError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn save_while_in_flight_is_refused() {
        let store = Arc::new(InMemoryStore::new());
        let page = store.create_page(1).await.unwrap();
        let manager = SessionManager::new(4, HOUR);
        let id = manager.open(EditorSession::new(page.id, template())).await.unwrap();

        let ticket = manager.with_mut(id, |s| s.begin_save()).await.unwrap().unwrap();
        let result = manager.save(id, store.clone()).await;
        assert_matches!(result, Err(AppError::Save(SaveError::InFlight)));

        manager
            .with_mut(id, |s| s.finish_save(&ticket, Ok(())))
            .await
            .unwrap()
            .unwrap();
        assert!(manager.save(id, store).await.is_ok());
    }

    #[tokio::test]
    async fn save_clears_unsaved_changes() {
        let store = Arc::new(InMemoryStore::new());
        let page = store.create_page(1).await.unwrap();
        let manager = SessionManager::new(4, HOUR);
        let id = manager.open(EditorSession::new(page.id, template())).await.unwrap();

        manager
            .with_mut(id, |s| s.apply_content(bride("Ana")))
            .await
            .unwrap();
        assert!(manager.with(id, |s| s.has_unsaved_changes()).await.unwrap());

        manager.save(id, store.clone()).await.unwrap();
        assert!(!manager.with(id, |s| s.has_unsaved_changes()).await.unwrap());
        let saved = store.load_page(page.id).await.unwrap().unwrap();
        assert_eq!(saved.content["bride"], "Ana");
    }

    #[tokio::test]
    async fn abandoned_save_still_completes_and_clears_flag() {
        let inner = InMemoryStore::new();
        let page = inner.create_page(1).await.unwrap();
        let store = Arc::new(SlowStore {
            inner,
            delay: Duration::from_millis(200),
        });
        let manager = SessionManager::new(4, HOUR);
        let id = manager.open(EditorSession::new(page.id, template())).await.unwrap();
        manager
            .with_mut(id, |s| s.apply_content(bride("Ana")))
            .await
            .unwrap();

        let cut_short =
            tokio::time::timeout(Duration::from_millis(20), manager.save(id, store.clone())).await;
        assert!(cut_short.is_err());
        assert!(manager.with(id, |s| s.is_saving()).await.unwrap());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!manager.with(id, |s| s.is_saving()).await.unwrap());
        assert!(!manager.with(id, |s| s.has_unsaved_changes()).await.unwrap());
        let saved = store.load_page(page.id).await.unwrap().unwrap();
        assert_eq!(saved.content["bride"], "Ana");

        assert!(manager.save(id, store).await.is_ok());
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted() {
        let manager = SessionManager::new(4, Duration::ZERO);
        manager.open(EditorSession::new(1, template())).await.unwrap();
        manager.open(EditorSession::new(2, template())).await.unwrap();

        assert_eq!(manager.evict_idle().await, 2);
        assert!(manager.is_empty().await);
    }

    #[tokio::test]
    async fn active_sessions_survive_the_sweep() {
        let manager = SessionManager::new(4, HOUR);
        let id = manager.open(EditorSession::new(1, template())).await.unwrap();

        assert_eq!(manager.evict_idle().await, 0);
        assert!(manager.with(id, |_| ()).await.is_ok());
    }

    #[tokio::test]
    async fn sessions_with_save_in_flight_are_not_evicted() {
        let manager = SessionManager::new(4, Duration::ZERO);
        let id = manager.open(EditorSession::new(1, template())).await.unwrap();
        manager.with_mut(id, |s| s.begin_save()).await.unwrap().unwrap();

        assert_eq!(manager.evict_idle().await, 0);
        assert_eq!(manager.len().await, 1);
    }

    #[tokio::test]
    async fn full_registry_evicts_idle_before_refusing() {
        let manager = SessionManager::new(1, Duration::ZERO);
        let first = manager.open(EditorSession::new(1, template())).await.unwrap();
        let second = manager.open(EditorSession::new(2, template())).await.unwrap();

        assert_eq!(manager.len().await, 1);
        assert_matches!(manager.with(first, |_| ()).await, Err(AppError::SessionNotFound(_)));
        assert!(manager.with(second, |_| ()).await.is_ok());
    }
}
