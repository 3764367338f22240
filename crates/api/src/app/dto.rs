//! Response envelope and small response DTOs.
//!
//! Every endpoint answers with `{ success, message?, data?, errors? }`.
//! Absent parts are omitted from the JSON, and failures never carry `data`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use userbase_core::{FieldError, UserId, ValidationErrors};

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T = ()> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            errors: None,
        }
    }

    pub fn ok_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }

    /// Pair the envelope with a status code.
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl ApiResponse {
    /// Success with only a confirmation message.
    pub fn confirmed(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            errors: None,
        }
    }

    pub fn validation_failure(errors: ValidationErrors) -> Self {
        Self {
            errors: Some(errors.into_inner()),
            ..Self::failure("Validation failed")
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        self.with_status(StatusCode::OK)
    }
}

/// Body of a successful create.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CreatedUser {
    pub id: UserId,
}
