use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    auth::AuthError,
    repository::RepositoryError,
    validation::{FieldViolation, ValidationErrors},
};

/// ApiError
///
/// Handler-level failures and their translation into HTTP responses.
/// Gate denials keep their identity so clients can tell 401 from 403.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    /// The request could not be parsed (bad query string, malformed or mistyped JSON).
    #[error("{message}")]
    MalformedRequest { status: StatusCode, message: String },
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::PostNotFound => ApiError::NotFound("Post"),
            RepositoryError::SlugTaken(_) => ApiError::Conflict(error.to_string()),
            // A dangling tag id is bad input, not a state conflict.
            RepositoryError::UnknownTag(_) => {
                ApiError::Validation(ValidationErrors::for_field("tag_ids", error.to_string()))
            }
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::AuthenticationRequired) => StatusCode::UNAUTHORIZED,
            ApiError::Auth(AuthError::InsufficientPermissions | AuthError::AccessDenied) => {
                StatusCode::FORBIDDEN
            }
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::MalformedRequest { status, .. } => *status,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Auth(AuthError::AuthenticationRequired) => "authentication_required",
            ApiError::Auth(AuthError::InsufficientPermissions) => "insufficient_permissions",
            ApiError::Auth(AuthError::AccessDenied) => "access_denied",
            ApiError::Validation(_) => "validation_failed",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::MalformedRequest { .. } => "malformed_request",
        }
    }
}

/// ErrorBody
///
/// Failure envelope: `{ success: false, error, message, violations }`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<FieldViolation>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.code().to_string();
        let message = self.to_string();
        let violations = match self {
            ApiError::Validation(errors) => errors.into_violations(),
            _ => Vec::new(),
        };

        let body = ErrorBody {
            success: false,
            error,
            message,
            violations,
        };
        (status, Json(body)).into_response()
    }
}
