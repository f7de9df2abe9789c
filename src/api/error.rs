//! API error handling.
//!
//! Every failure leaves the API as JSON:
//!
//! ```json
//! {
//!     "code": "LAST_ADMIN",
//!     "message": "group 3 must keep at least one administrator",
//!     "details": null
//! }
//! ```
//!
//! Validation failures carry their field errors in `details`. Storage
//! failures are logged and reported as a bare `INTERNAL_ERROR`.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::{ServiceError, ValidationError};
use crate::domain::DomainError;
use crate::infrastructure::RepositoryError;

// =============================================================================
// API Error
// =============================================================================

/// API error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Field errors for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

// =============================================================================
// API Error Response
// =============================================================================

/// Status code plus error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorResponse {
    pub status: StatusCode,
    pub error: ApiError,
}

impl ApiErrorResponse {
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// 400 with field-level details.
    #[must_use]
    pub fn validation_error(error: &ValidationError) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiError::with_details(
                "VALIDATION_ERROR",
                "Validation failed",
                serde_json::to_value(&error.errors).unwrap_or_default(),
            ),
        )
    }

    /// 400 for a body or query string that could not be decoded.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiError::new("BAD_REQUEST", message),
        )
    }

    /// 401 for a missing or unusable bearer token.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::from(DomainError::Unauthenticated)
    }

    /// 500 without internal details.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("INTERNAL_ERROR", "An internal error occurred"),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

/// Status code and error code for a domain failure.
const fn domain_error_status(error: &DomainError) -> (StatusCode, &'static str) {
    match error {
        DomainError::GroupNotFound(_) => (StatusCode::NOT_FOUND, "GROUP_NOT_FOUND"),
        DomainError::UserNotFound(_) => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
        DomainError::MemberNotFound { .. } => (StatusCode::NOT_FOUND, "MEMBER_NOT_FOUND"),
        DomainError::TaskNotFound(_) => (StatusCode::NOT_FOUND, "TASK_NOT_FOUND"),
        DomainError::NotAMember(_) => (StatusCode::FORBIDDEN, "NOT_A_MEMBER"),
        DomainError::AdminRequired(_) => (StatusCode::FORBIDDEN, "ADMIN_REQUIRED"),
        DomainError::TaskForbidden(_) => (StatusCode::FORBIDDEN, "TASK_FORBIDDEN"),
        DomainError::AlreadyMember { .. } => (StatusCode::CONFLICT, "ALREADY_MEMBER"),
        DomainError::EmailTaken(_) => (StatusCode::CONFLICT, "EMAIL_TAKEN"),
        DomainError::LastAdmin(_) => (StatusCode::CONFLICT, "LAST_ADMIN"),
        DomainError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
        DomainError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
        DomainError::AssigneeNotMember { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "ASSIGNEE_NOT_MEMBER")
        }
    }
}

impl From<DomainError> for ApiErrorResponse {
    fn from(error: DomainError) -> Self {
        let (status, code) = domain_error_status(&error);
        Self::new(status, ApiError::new(code, error.to_string()))
    }
}

impl From<ValidationError> for ApiErrorResponse {
    fn from(error: ValidationError) -> Self {
        Self::validation_error(&error)
    }
}

impl From<RepositoryError> for ApiErrorResponse {
    fn from(error: RepositoryError) -> Self {
        tracing::error!(%error, "Repository failure");
        Self::internal_error()
    }
}

impl From<ServiceError> for ApiErrorResponse {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Validation(error) => error.into(),
            ServiceError::Domain(error) => error.into(),
            ServiceError::Repository(error) => error.into(),
            ServiceError::Internal(message) => {
                tracing::error!(%message, "Internal failure");
                Self::internal_error()
            }
        }
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiErrorResponse {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiErrorResponse {
    fn from(rejection: PathRejection) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            ApiError::new("NOT_FOUND", rejection.body_text()),
        )
    }
}
