//! Handlers for page instances: create, load and save outside an editor
//! session.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use invite_core::config::Customization;
use invite_core::error::CoreError;
use invite_core::types::{DbId, PageContent};

use super::{check_sections, ensure_template_exists};
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePage {
    pub template_id: DbId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePage {
    pub template_id: DbId,
    #[serde(default)]
    pub customization: Customization,
    #[serde(default = "empty_content")]
    pub content: PageContent,
}

fn empty_content() -> PageContent {
    PageContent::Object(Default::default())
}

// ---------------------------------------------------------------------------
// POST /pages
// ---------------------------------------------------------------------------

/// Create an empty page bound to an existing template.
pub async fn create_page(
    State(state): State<AppState>,
    Json(body): Json<CreatePage>,
) -> AppResult<impl IntoResponse> {
    ensure_template_exists(&state, body.template_id).await?;
    let page = state.store.create_page(body.template_id).await?;

    tracing::info!(page_id = page.id, template_id = page.template_id, "Page created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: page })))
}

// ---------------------------------------------------------------------------
// GET /pages/{id}
// ---------------------------------------------------------------------------

pub async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .store
        .load_page(id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Page", id })?;
    Ok(Json(DataResponse { data: page }))
}

// ---------------------------------------------------------------------------
// PUT /pages/{id}
// ---------------------------------------------------------------------------

/// Overwrite a page's customization and content.
///
/// Only the customization is stored; the resolved configuration is always
/// recomputed from the template.
pub async fn save_page(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<SavePage>,
) -> AppResult<impl IntoResponse> {
    check_sections(&body.customization)?;
    if !body.content.is_object() {
        return Err(AppError::BadRequest(
            "Page content must be a JSON object".to_string(),
        ));
    }
    ensure_template_exists(&state, body.template_id).await?;

    let page = state
        .store
        .save_page(id, body.template_id, &body.customization, &body.content)
        .await?;

    tracing::info!(page_id = id, template_id = body.template_id, "Page saved");

    Ok(Json(DataResponse { data: page }))
}
