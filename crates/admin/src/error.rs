//! Unified error handling with Sentry integration.
//!
//! Mirrors the storefront's `AppError` shape: JSON bodies with stable
//! machine-readable codes, Sentry capture for server-side failures, and
//! domain-rule violations surfaced with their own codes rather than a
//! generic failure.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bagworks_core::order::OrderError;
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Order lifecycle rule violation.
    #[error("Order lifecycle error: {0}")]
    Lifecycle(#[from] OrderError),

    /// Malformed input, surfaced per field.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body: `{"error": {"code", "message", "fields"?}}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldError>>,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Repository(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Lifecycle(_) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Repository(err) => match err {
                RepositoryError::NotFound => "not_found",
                RepositoryError::Conflict(_) => "conflict",
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => "internal",
            },
            Self::Lifecycle(err) => err.code(),
            Self::Validation(_) => "validation_failed",
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::BadRequest(_) => "bad_request",
            Self::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Internal(_)
                | Self::Repository(
                    RepositoryError::Database(_) | RepositoryError::DataCorruption(_)
                )
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let code = self.code().to_string();

        // Don't expose internal error details to clients
        let (message, fields) = match self {
            Self::Repository(
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_),
            )
            | Self::Internal(_) => ("Internal server error".to_string(), None),
            Self::Validation(fields) => ("Validation failed".to_string(), Some(fields)),
            other => (other.to_string(), None),
        };

        (
            status,
            Json(ErrorBody {
                error: ErrorDetail {
                    code,
                    message,
                    fields,
                },
            }),
        )
            .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bagworks_core::OrderStatus;

    use super::*;

    #[test]
    fn test_lifecycle_errors_keep_their_codes() {
        let err = AppError::Lifecycle(OrderError::AlreadyTerminal {
            status: OrderStatus::Delivered,
        });
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "order_already_terminal");

        let err = AppError::Lifecycle(OrderError::TrackingAlreadySet);
        assert_eq!(err.code(), "tracking_already_set");
    }

    #[test]
    fn test_forbidden_status() {
        assert_eq!(
            AppError::Forbidden("viewer role".into()).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "invalid_transition".to_string(),
                message: "cannot transition order from pending to shipped".to_string(),
                fields: None,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["error"]["code"], "invalid_transition");
        assert!(value["error"].get("fields").is_none());
    }
}
