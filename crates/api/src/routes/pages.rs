//! Route definitions for page instances.
//!
//! ```text
//! POST /                  create_page
//! GET  /{id}              get_page
//! PUT  /{id}              save_page
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::pages;
use crate::state::AppState;

/// Page routes, mounted at `/pages`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(pages::create_page))
        .route("/{id}", get(pages::get_page).put(pages::save_page))
}
