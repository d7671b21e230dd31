//! Integration tests for page create, load and save.

mod common;

use axum::http::StatusCode;
use common::{body_json, garden_base, get, post_json, put_json, seed_page, seed_template};
use serde_json::json;

#[tokio::test]
async fn create_page_requires_existing_template() {
    let app = common::build_test_app();
    let response = post_json(&app.router, "/api/v1/pages", json!({ "templateId": 7 })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn created_page_starts_empty() {
    let app = common::build_test_app();
    let template_id = seed_template(&app, "garden", garden_base()).await;
    let page_id = seed_page(&app, template_id).await;

    let response = get(&app.router, &format!("/api/v1/pages/{page_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["templateId"], template_id);
    assert_eq!(json["data"]["customization"], json!({}));
    assert_eq!(json["data"]["content"], json!({}));
}

#[tokio::test]
async fn save_stores_customization_verbatim() {
    let app = common::build_test_app();
    let template_id = seed_template(&app, "garden", garden_base()).await;
    let page_id = seed_page(&app, template_id).await;

    let customization = json!({
        "colors": { "accent": "#eeeeee" },
        "sections": { "hero": { "title": "Ana & Ben" } }
    });
    let response = put_json(
        &app.router,
        &format!("/api/v1/pages/{page_id}"),
        json!({
            "templateId": template_id,
            "customization": customization,
            "content": { "bride": "Ana", "groom": "Ben" }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(&app.router, &format!("/api/v1/pages/{page_id}")).await).await;
    assert_eq!(json["data"]["customization"], customization);
    assert_eq!(json["data"]["content"]["groom"], "Ben");
    assert!(json["data"]["customization"]["colors"].get("primary").is_none());
}

#[tokio::test]
async fn save_rejects_duplicate_section_ids() {
    let app = common::build_test_app();
    let template_id = seed_template(&app, "garden", garden_base()).await;
    let page_id = seed_page(&app, template_id).await;

    let response = put_json(
        &app.router,
        &format!("/api/v1/pages/{page_id}"),
        json!({
            "templateId": template_id,
            "customization": { "sections": [{ "id": "hero" }, { "id": "hero" }] }
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Duplicate section id 'hero'");
}

#[tokio::test]
async fn save_rejects_non_object_content() {
    let app = common::build_test_app();
    let template_id = seed_template(&app, "garden", garden_base()).await;
    let page_id = seed_page(&app, template_id).await;

    let response = put_json(
        &app.router,
        &format!("/api/v1/pages/{page_id}"),
        json!({ "templateId": template_id, "content": [1, 2, 3] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn saving_unknown_page_returns_404() {
    let app = common::build_test_app();
    let template_id = seed_template(&app, "garden", garden_base()).await;

    let response = put_json(
        &app.router,
        "/api/v1/pages/41",
        json!({ "templateId": template_id }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
