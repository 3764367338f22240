//! Request-level failures and their envelopes.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use userbase_core::ValidationErrors;
use userbase_infra::StoreError;

use crate::app::dto::ApiResponse;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const DUPLICATE_EMAIL_MESSAGE: &str = "User with this email already exists";

/// Raw detail of an internal failure, attached to the response so the
/// fault-handling middleware can log it and decide whether to expose it.
#[derive(Debug, Clone)]
pub struct FailureDetail(pub String);

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("duplicate email")]
    DuplicateEmail,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn user_not_found() -> Self {
        Self::NotFound("User not found")
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::DuplicateEmail | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ApiError::DuplicateEmail,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(errors) => {
                ApiResponse::validation_failure(errors).with_status(status)
            }
            ApiError::DuplicateEmail => {
                ApiResponse::failure(DUPLICATE_EMAIL_MESSAGE).with_status(status)
            }
            ApiError::NotFound(message) => ApiResponse::failure(message).with_status(status),
            ApiError::BadRequest(message) => ApiResponse::failure(message).with_status(status),
            ApiError::Internal(detail) => {
                let mut response = internal_error_response(INTERNAL_ERROR_MESSAGE);
                response.extensions_mut().insert(FailureDetail(detail));
                response
            }
        }
    }
}

/// A 500 envelope carrying `message`.
pub fn internal_error_response(message: impl Into<String>) -> Response {
    ApiResponse::failure(message).with_status(StatusCode::INTERNAL_SERVER_ERROR)
}
