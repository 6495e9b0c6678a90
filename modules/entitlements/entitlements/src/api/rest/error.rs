use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use entitlements_sdk::FieldViolation;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::error::DomainError;

/// One invalid input field, as returned in `details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldErrorDto {
    pub field: String,
    pub message: String,
}

impl From<FieldViolation> for FieldErrorDto {
    fn from(v: FieldViolation) -> Self {
        Self {
            field: v.field,
            message: v.message,
        }
    }
}

/// Failure envelope: `{success: false, error, message, details?}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldErrorDto>,
}

/// Error returned by every REST handler and extractor.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: String,
    pub details: Vec<FieldErrorDto>,
}

impl ApiError {
    fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let detail = FieldErrorDto {
            field: field.into(),
            message: message.into(),
        };
        let mut err = Self::bad_request(format!("{}: {}", detail.field, detail.message));
        err.details.push(detail);
        err
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::ClientNotFound { .. }
            | DomainError::PlanNotFound { .. }
            | DomainError::ModuleNotFound { .. }
            | DomainError::SubscriptionNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string())
            }
            DomainError::ClientTenantMismatch { .. }
            | DomainError::PlanCodeTaken { .. }
            | DomainError::PlanInUse { .. } => {
                Self::new(StatusCode::CONFLICT, "CONFLICT", e.to_string())
            }
            DomainError::InvalidStatusTransition { from, .. } => Self::invalid_field(
                "status",
                format!("{e} (transition from '{from}' is not allowed)"),
            ),
            DomainError::Validation { violations } => {
                let message = violations
                    .iter()
                    .map(|v| format!("{}: {}", v.field, v.message))
                    .collect::<Vec<_>>()
                    .join("; ");
                let mut err = Self::bad_request(message);
                err.details = violations.into_iter().map(Into::into).collect();
                err
            }
            DomainError::Database { .. } => {
                tracing::error!(error = ?e, "Database error occurred");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.error,
            message: self.message,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
