pub mod health;
pub mod pages;
pub mod sessions;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /templates                                       list, register
/// /templates/{id}                                  get
/// /templates/{id}/preview                          resolve a customization (POST)
///
/// /pages                                           create (POST)
/// /pages/{id}                                      get, save (PUT)
///
/// /sessions                                        open (POST)
/// /sessions/{id}                                   get, apply edits (PATCH), close
/// /sessions/{id}/commit                            checkpoint (POST)
/// /sessions/{id}/undo                              undo (POST)
/// /sessions/{id}/redo                              redo (POST)
/// /sessions/{id}/template                          switch template (POST)
/// /sessions/{id}/save                              persist (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/templates", templates::router())
        .nest("/pages", pages::router())
        .nest("/sessions", sessions::router())
}
