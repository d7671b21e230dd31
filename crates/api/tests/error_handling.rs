//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no router needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use invite_api::error::AppError;
use invite_core::error::CoreError;
use invite_core::session::SaveError;
use uuid::Uuid;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Template",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Template with id 42 not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("Duplicate section id 'hero'".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Duplicate section id 'hero'");
}

#[tokio::test]
async fn conflict_error_returns_409() {
    let err = AppError::Core(CoreError::Conflict("duplicate slug".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn storage_error_is_sanitized() {
    let err = AppError::Core(CoreError::Storage("password authentication failed".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn save_in_flight_returns_409() {
    let (status, json) = error_to_response(AppError::Save(SaveError::InFlight)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "SAVE_IN_PROGRESS");
}

#[tokio::test]
async fn failed_save_hides_reason() {
    let err = AppError::Save(SaveError::Failed {
        reason: "connection reset".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "SAVE_FAILED");
    assert!(!json["error"].as_str().unwrap().contains("connection reset"));
}

#[tokio::test]
async fn missing_session_returns_404() {
    let id = Uuid::nil();
    let (status, json) = error_to_response(AppError::SessionNotFound(id)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        json["error"],
        "Editor session 00000000-0000-0000-0000-000000000000 not found"
    );
}

#[tokio::test]
async fn session_limit_returns_503() {
    let (status, json) = error_to_response(AppError::SessionLimit(8)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "SESSION_LIMIT");
}

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("secret database credentials leaked".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}
