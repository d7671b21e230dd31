use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use invite_core::error::CoreError;
use invite_core::session::SaveError;
use serde_json::json;
use uuid::Uuid;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `invite_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A save attempt on an editor session failed or was refused.
    #[error(transparent)]
    Save(#[from] SaveError),

    /// No open editor session with this id.
    #[error("Editor session {0} not found")]
    SessionNotFound(Uuid),

    /// The session table is full.
    #[error("Too many open editor sessions (limit {0})")]
    SessionLimit(usize),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Storage(msg) => {
                    tracing::error!(error = %msg, "Storage error");
                    internal()
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Save errors ---
            AppError::Save(SaveError::InFlight) => (
                StatusCode::CONFLICT,
                "SAVE_IN_PROGRESS",
                "A save is already in progress".to_string(),
            ),
            AppError::Save(SaveError::Failed { reason }) => {
                tracing::error!(error = %reason, "Save failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SAVE_FAILED",
                    "Saving failed; your changes are kept and can be saved again".to_string(),
                )
            }

            // --- Sessions ---
            AppError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Editor session {id} not found"),
            ),
            AppError::SessionLimit(limit) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SESSION_LIMIT",
                format!("Too many open editor sessions (limit {limit})"),
            ),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
