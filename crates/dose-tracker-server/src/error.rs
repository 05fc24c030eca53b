//! HTTP error mapping.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dose_tracker_core::{AuthError, TrackerError};
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned to clients as `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Log the cause and hide it from the client.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        error!(%cause, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.message
        }));
        (self.status, body).into_response()
    }
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Validation(e) => ApiError::bad_request(e.to_string()),
            TrackerError::NotFound(what) => {
                ApiError::new(StatusCode::NOT_FOUND, format!("Not found: {}", what))
            }
            TrackerError::Conflict(message) => ApiError::new(StatusCode::CONFLICT, message),
            TrackerError::Auth(
                e @ (AuthError::InvalidCredentials | AuthError::InvalidSession),
            ) => ApiError::unauthorized(e.to_string()),
            TrackerError::Auth(e @ (AuthError::EmptyEmail | AuthError::PasswordTooShort(_))) => {
                ApiError::bad_request(e.to_string())
            }
            other @ (TrackerError::Auth(AuthError::Hashing(_))
            | TrackerError::Database(_)
            | TrackerError::Lock(_)) => ApiError::internal(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}
