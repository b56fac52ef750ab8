use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Unified application error.
///
/// The HTTP handlers are the single translation boundary between storage
/// failures and client-visible status codes; `IntoResponse` below is where
/// that mapping lives. Detailed causes are logged server-side and never
/// echoed to the client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request payload failed validation. The message is client-safe.
    #[error("{0}")]
    Validation(String),

    /// No `cursos` row matches the requested id.
    #[error("Curso not found")]
    NotFound,

    /// Unexpected failure carrying a generic, client-safe message.
    #[error("{0}")]
    Internal(String),

    /// Raw storage failure that was not given a client-facing message.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Transport failure in the client API facade.
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// Startup configuration failure.
    #[error("config error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // sqlx reports a missing row as its own error code; clients only
            // ever see the handler's NotFound.
            sqlx::Error::RowNotFound => AppError::NotFound,
            other => AppError::Database(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Curso not found".to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Database(err) => {
                error!("database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Network(msg) | AppError::Parse(msg) | AppError::Config(msg) => {
                error!("{}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
