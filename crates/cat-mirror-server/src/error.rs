use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cat_mirror::QueryError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Every variant renders as `{"error": ..., "code": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    /// A sync run failed. Carries the underlying failure message.
    #[error("{0}")]
    SyncFailed(String),

    #[error(transparent)]
    Query(#[from] QueryError),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::SyncFailed(msg) => {
                tracing::error!(error = %msg, "sync request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SYNC_FAILED",
                    msg.clone(),
                )
            }
            AppError::Query(err) => {
                tracing::error!(error = %err, "query failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
