use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::core::templates;

/// Request-level error taxonomy.
///
/// Field-level validation failures are not errors: handlers re-render the
/// form with an error map instead. Visibility violations on read paths are
/// reported as `NotFound` so hidden content cannot be probed for.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(ref msg) => {
                tracing::debug!("Bad request: {}", msg);
                StatusCode::BAD_REQUEST
            }
            AppError::Template(ref msg) => {
                tracing::error!("Template error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Html(templates::error_page(status))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
