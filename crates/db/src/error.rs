//! Mapping of sqlx errors onto domain errors.

use invite_core::error::CoreError;

/// Classify a sqlx error into a [`CoreError`].
///
/// - Unique constraint violations (constraint name starting with `uq_`) map
///   to `Conflict`.
/// - Everything else maps to `Storage` with the driver message; callers at
///   the HTTP edge sanitize it.
pub fn classify_sqlx_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        // PostgreSQL unique constraint violation: error code 23505
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Storage(err.to_string())
}
