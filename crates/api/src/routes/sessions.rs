//! Route definitions for editor sessions.
//!
//! ```text
//! POST   /                    create_session
//! GET    /{id}                get_session
//! PATCH  /{id}                apply_edits
//! DELETE /{id}                close_session
//! POST   /{id}/commit         commit
//! POST   /{id}/undo           undo
//! POST   /{id}/redo           redo
//! POST   /{id}/template       switch_template
//! POST   /{id}/save           save
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sessions;
use crate::state::AppState;

/// Session routes, mounted at `/sessions`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(sessions::create_session))
        .route(
            "/{id}",
            get(sessions::get_session)
                .patch(sessions::apply_edits)
                .delete(sessions::close_session),
        )
        .route("/{id}/commit", post(sessions::commit))
        .route("/{id}/undo", post(sessions::undo))
        .route("/{id}/redo", post(sessions::redo))
        .route("/{id}/template", post(sessions::switch_template))
        .route("/{id}/save", post(sessions::save))
}
