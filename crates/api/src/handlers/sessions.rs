//! Handlers for editor sessions.
//!
//! A session wraps one page being edited: live customization and content,
//! the preview derived from them, and the undo/redo history. Edits made via
//! `PATCH` update the preview immediately but only become undo points on
//! `commit`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use invite_core::config::Customization;
use invite_core::error::CoreError;
use invite_core::session::EditorSession;
use invite_core::types::DbId;

use super::{check_sections, ensure_template_exists};
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::sessions::SessionView;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSession {
    pub page_id: DbId,
    /// Start over on this template instead of resuming the page's saved
    /// state. Ignored when it equals the page's current template.
    pub template_id: Option<DbId>,
}

/// Live edit fragment. Either part may be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct ApplyEdits {
    pub customization: Option<Customization>,
    pub content: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchTemplate {
    pub template_id: DbId,
}

/// Result of a history operation: whether anything changed, and the
/// session afterwards.
#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub applied: bool,
    pub session: SessionView,
}

// ---------------------------------------------------------------------------
// POST /sessions
// ---------------------------------------------------------------------------

/// Open an editor session on a saved page.
pub async fn create_session(
    State(state): State<AppState>,
    Json(body): Json<CreateSession>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .store
        .load_page(body.page_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Page",
            id: body.page_id,
        })?;

    let session = match body.template_id {
        Some(template_id) if template_id != page.template_id => {
            let template = ensure_template_exists(&state, template_id).await?;
            EditorSession::new(page.id, template)
        }
        _ => {
            let template = ensure_template_exists(&state, page.template_id).await?;
            EditorSession::from_saved(page, template)
        }
    };

    let id = state.sessions.open(session).await?;
    let view = state.sessions.with(id, |s| SessionView::of(id, s)).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

// ---------------------------------------------------------------------------
// GET /sessions/{id}
// ---------------------------------------------------------------------------

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let view = state.sessions.with(id, |s| SessionView::of(id, s)).await?;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// PATCH /sessions/{id}
// ---------------------------------------------------------------------------

/// Apply a live edit. Not an undo point until the next commit.
pub async fn apply_edits(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ApplyEdits>,
) -> AppResult<impl IntoResponse> {
    if let Some(fragment) = &body.customization {
        check_sections(fragment)?;
    }

    let view = state
        .sessions
        .with_mut(id, |session| {
            if let Some(fragment) = body.customization {
                session.apply(fragment);
            }
            if let Some(content) = body.content {
                session.apply_content(content);
            }
            SessionView::of(id, session)
        })
        .await?;

    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// POST /sessions/{id}/commit
// ---------------------------------------------------------------------------

/// Record the live state as an undo point. Unchanged state is not recorded.
pub async fn commit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let step = state
        .sessions
        .with_mut(id, |session| StepResponse {
            applied: session.checkpoint(),
            session: SessionView::of(id, session),
        })
        .await?;
    tracing::debug!(session_id = %id, applied = step.applied, "Checkpoint");
    Ok(Json(DataResponse { data: step }))
}

// ---------------------------------------------------------------------------
// POST /sessions/{id}/undo, /redo
// ---------------------------------------------------------------------------

/// Step back one undo point. A no-op at the oldest entry.
pub async fn undo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let step = state
        .sessions
        .with_mut(id, |session| StepResponse {
            applied: session.undo(),
            session: SessionView::of(id, session),
        })
        .await?;
    Ok(Json(DataResponse { data: step }))
}

/// Step forward one undo point. A no-op at the newest entry.
pub async fn redo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let step = state
        .sessions
        .with_mut(id, |session| StepResponse {
            applied: session.redo(),
            session: SessionView::of(id, session),
        })
        .await?;
    Ok(Json(DataResponse { data: step }))
}

// ---------------------------------------------------------------------------
// POST /sessions/{id}/template
// ---------------------------------------------------------------------------

/// Switch the session to another base template, clearing its state and
/// history.
pub async fn switch_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SwitchTemplate>,
) -> AppResult<impl IntoResponse> {
    let template = ensure_template_exists(&state, body.template_id).await?;
    let view = state
        .sessions
        .with_mut(id, |session| {
            session.switch_template(template);
            SessionView::of(id, session)
        })
        .await?;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// POST /sessions/{id}/save
// ---------------------------------------------------------------------------

/// Persist the session's customization and content. Returns 409 while
/// another save for the session is in flight.
pub async fn save(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let customization = state
        .sessions
        .with(id, |session| session.customization().clone())
        .await?;
    check_sections(&customization)?;

    state.sessions.save(id, state.store.clone()).await?;

    let view = state.sessions.with(id, |s| SessionView::of(id, s)).await?;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// DELETE /sessions/{id}
// ---------------------------------------------------------------------------

/// End a session. Unsaved changes are discarded.
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    state.sessions.close(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
