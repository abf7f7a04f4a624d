//! API error handling.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<hyperbio_core::Error> for ApiError {
    fn from(err: hyperbio_core::Error) -> Self {
        match err {
            hyperbio_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            hyperbio_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            hyperbio_core::Error::InvalidTransition(msg) => ApiError::Conflict(msg),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<hyperbio_db::DbError> for ApiError {
    fn from(err: hyperbio_db::DbError) -> Self {
        match err {
            hyperbio_db::DbError::NotFound(msg) => ApiError::NotFound(msg),
            hyperbio_db::DbError::InvalidInput(msg) => ApiError::BadRequest(msg),
            hyperbio_db::DbError::InvalidTransition(msg) => {
                // A transition conflict means a duplicate trigger or a
                // concurrency bug; make it visible in the logs.
                tracing::error!(error = %msg, "Rejected invalid job transition");
                ApiError::Conflict(msg)
            }
            hyperbio_db::DbError::Duplicate(msg) => ApiError::Conflict(msg),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
