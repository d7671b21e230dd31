//! Handlers for the template catalog and stateless previews.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use invite_core::config::Customization;
use invite_core::session::Preview;
use invite_core::store::NewTemplate;
use invite_core::types::DbId;

use super::{check_sections, ensure_template_exists};
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /templates
// ---------------------------------------------------------------------------

/// List every template in the catalog.
pub async fn list_templates(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let templates = state.catalog.list_templates().await?;
    tracing::debug!(count = templates.len(), "Listed templates");
    Ok(Json(DataResponse { data: templates }))
}

// ---------------------------------------------------------------------------
// POST /templates
// ---------------------------------------------------------------------------

/// Register a template. Slugs are unique.
pub async fn create_template(
    State(state): State<AppState>,
    Json(body): Json<NewTemplate>,
) -> AppResult<impl IntoResponse> {
    body.check()?;
    check_sections(&body.base_config)?;

    let template = state.catalog.create_template(&body).await?;

    tracing::info!(template_id = template.id, slug = %template.slug, "Template registered");

    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

// ---------------------------------------------------------------------------
// GET /templates/{id}
// ---------------------------------------------------------------------------

pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = ensure_template_exists(&state, id).await?;
    Ok(Json(DataResponse { data: template }))
}

// ---------------------------------------------------------------------------
// POST /templates/{id}/preview
// ---------------------------------------------------------------------------

/// Resolve a customization against a template without opening a session.
///
/// The body may be any partial customization, including `{}`.
pub async fn preview_template(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(customization): Json<Customization>,
) -> AppResult<impl IntoResponse> {
    let template = ensure_template_exists(&state, id).await?;
    let preview = Preview::resolve(&template, &customization);

    tracing::debug!(
        template_id = id,
        visible_sections = preview.sections.len(),
        "Resolved template preview"
    );

    Ok(Json(DataResponse { data: preview }))
}
