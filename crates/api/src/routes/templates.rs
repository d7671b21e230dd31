//! Route definitions for the template catalog.
//!
//! ```text
//! GET  /                  list_templates
//! POST /                  create_template
//! GET  /{id}              get_template
//! POST /{id}/preview      preview_template
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::templates;
use crate::state::AppState;

/// Template routes, mounted at `/templates`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(templates::list_templates).post(templates::create_template),
        )
        .route("/{id}", get(templates::get_template))
        .route("/{id}/preview", post(templates::preview_template))
}
