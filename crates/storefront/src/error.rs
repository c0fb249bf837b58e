//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`. Domain-rule violations keep their specific
//! machine-readable codes in the JSON body; they are never collapsed into
//! a generic failure.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bagworks_core::checkout::CheckoutError;
use bagworks_core::coupon::CouponRejection;
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Coupon rejected by validation rules.
    #[error("Coupon rejected: {0}")]
    Coupon(#[from] CouponRejection),

    /// Checkout wizard rejected the operation.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Malformed input, surfaced per field.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

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
            Self::Coupon(CouponRejection::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Coupon(_) | Self::Checkout(_) | Self::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
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
            Self::Coupon(rejection) => rejection.code(),
            Self::Checkout(err) => err.code(),
            Self::Validation(_) => "validation_failed",
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) => "unauthorized",
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
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("order 4".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Coupon(CouponRejection::Expired).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Coupon(CouponRejection::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Checkout(CheckoutError::MissingAddress).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Unauthorized("no token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_domain_codes_are_preserved() {
        assert_eq!(AppError::Coupon(CouponRejection::Expired).code(), "coupon_expired");
        assert_eq!(
            AppError::Checkout(CheckoutError::MissingAddress).code(),
            "missing_address"
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let response = AppError::Internal("connection pool exhausted".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "min_cart_not_met".to_string(),
                message: "add ₹150.00 more".to_string(),
                fields: None,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["error"]["code"], "min_cart_not_met");
        // Absent fields are omitted, not null.
        assert!(value["error"].get("fields").is_none());
    }
}
