//! HTTP error mapping for API handlers.

use crate::AppError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cipherstudio_core::FileSetError;
use serde_json::json;

const GENERIC_SERVER_ERROR: &str = "Server error";

/// Error returned by handlers, rendered as `{"message": ...}`.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::NotFound => Self::not_found("Not found"),
            AppError::BadRequest(message) => Self::bad_request(message),
            AppError::Files(err) => Self::bad_request(err.to_string()),
            AppError::Unauthorized => Self::unauthorized(),
            other => {
                tracing::error!("Request failed: {}", other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_SERVER_ERROR)
            }
        }
    }
}

impl From<FileSetError> for HttpError {
    fn from(err: FileSetError) -> Self {
        Self::from(AppError::Files(err))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_errors_map_to_statuses_and_messages() {
        let cases = [
            (AppError::NotFound, StatusCode::NOT_FOUND, "Not found"),
            (
                AppError::BadRequest("Missing fields".into()),
                StatusCode::BAD_REQUEST,
                "Missing fields",
            ),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED, "Unauthorized"),
            (
                AppError::Files(FileSetError::InvalidName),
                StatusCode::BAD_REQUEST,
                "File name must not be empty",
            ),
            (
                AppError::StorageMessage("disk on fire".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_SERVER_ERROR,
            ),
            (
                AppError::Auth("bcrypt".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_SERVER_ERROR,
            ),
        ];

        for (err, status, message) in cases {
            let mapped = HttpError::from(err);
            assert_eq!(mapped.status(), status);
            assert_eq!(mapped.message(), message);
        }
    }
}
