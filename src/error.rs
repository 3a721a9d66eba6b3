use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application-specific errors with HTTP status code mappings.
///
/// Every handler failure funnels through `into_response`, which emits the
/// uniform `{success:false, error}` envelope. 5xx variants log full detail
/// operator-side and hand the client a generic message only.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("no file uploaded")]
    MissingUpload,

    #[error("timed out waiting for a database connection")]
    Timeout,

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        // The pool's bounded acquire wait surfaces as PoolTimedOut; every
        // other database failure is a plain 500.
        match err {
            sqlx::Error::PoolTimedOut => AppError::Timeout,
            other => AppError::Database(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(msg) => {
                tracing::warn!("Request validation failed: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::NotFound(resource) => {
                tracing::warn!("{} not found", resource);
                (StatusCode::NOT_FOUND, format!("{resource} not found"))
            }
            AppError::MissingUpload => {
                tracing::warn!("Upload request without a file");
                (StatusCode::BAD_REQUEST, "No file uploaded".to_string())
            }
            AppError::Timeout => {
                tracing::error!("Timed out waiting for a database connection");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Database is busy, please try again later".to_string(),
                )
            }
            AppError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Io(err) => {
                tracing::error!("Storage error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(err) => {
                tracing::error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(json!({ "success": false, "error": error_message })),
        )
            .into_response()
    }
}
