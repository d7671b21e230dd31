#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use invite_api::config::ServerConfig;
use invite_api::router::build_app_router;
use invite_api::state::AppState;
use invite_core::store::{InMemoryStore, NewTemplate, TemplateCatalog};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_editor_sessions: 8,
        session_idle_timeout_secs: 1800,
    }
}

/// A router wired to an in-memory store, plus the store itself for seeding
/// and assertions.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
}

/// Build the full application router over an [`InMemoryStore`].
///
/// Uses the same [`build_app_router`] as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(store.clone(), store.clone(), config.clone());
    let router = build_app_router(state, &config).unwrap();
    TestApp { router, store }
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config())
}

/// Base configuration of the seeded `garden` template: legacy keyed-map
/// sections, one of them disabled.
pub fn garden_base() -> Value {
    json!({
        "colors": { "primary": "#2f4f2f", "secondary": "#c9b037" },
        "typography": { "headingFont": "Playfair Display" },
        "sections": {
            "hero": { "title": "Together", "enabled": true },
            "story": { "enabled": false },
            "gallery": {},
            "rsvp": { "deadline": "2026-05-01" }
        }
    })
}

/// Base configuration of the seeded `modern` template: canonical list.
pub fn modern_base() -> Value {
    json!({
        "colors": { "primary": "#111111" },
        "sections": [
            { "id": "rsvp", "type": "rsvp", "isVisible": true, "order": 2 },
            { "id": "hero", "type": "hero", "isVisible": true, "order": 0 }
        ]
    })
}

/// Register a template and return its id.
pub async fn seed_template(app: &TestApp, slug: &str, base: Value) -> i64 {
    let template = app
        .store
        .create_template(&NewTemplate {
            slug: slug.to_string(),
            name: slug.to_string(),
            description: None,
            base_config: serde_json::from_value(base).unwrap(),
        })
        .await
        .unwrap();
    template.id
}

/// Create a page on `template_id` through the API and return its id.
pub async fn seed_page(app: &TestApp, template_id: i64) -> i64 {
    let response = post_json(&app.router, "/api/v1/pages", json!({ "templateId": template_id })).await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Open a session on `page_id` and return its id.
pub async fn open_session(app: &TestApp, page_id: i64) -> String {
    let response = post_json(&app.router, "/api/v1/sessions", json!({ "pageId": page_id })).await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn patch_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
