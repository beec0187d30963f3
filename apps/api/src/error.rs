//! # API Error Types
//!
//! Every failure leaving a handler is an [`ApiError`]; its code fixes the
//! HTTP status.
//!
//! ## Mapping
//! ```text
//! CoreError::CustomerNotFound / InvoiceNotFound  ──► NOT_FOUND       404
//! CoreError::Duplicate* / EmailInUse / HasInv.   ──► CONFLICT        400
//! CoreError::EmptyItems / TotalMismatch / Valid. ──► VALIDATION      400
//! AuthError::InvalidCredentials / MissingToken   ──► UNAUTHORIZED    401
//! AuthError::InvalidOrExpiredToken               ──► FORBIDDEN       403
//! DbError (unclassified)                         ──► DATABASE        500
//! RenderError                                    ──► RENDER          500
//! ```
//!
//! ## Body
//! ```json
//! { "error": "Invoice number already exists", "code": "CONFLICT" }
//! ```

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use invoice_core::{CoreError, ValidationError};
use invoice_db::DbError;
use invoice_pdf::RenderError;

// =============================================================================
// Auth Errors
// =============================================================================

/// Authentication failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("User with this email already exists")]
    EmailTaken,

    #[error("Password must be at least {min} characters long")]
    WeakPassword { min: usize },

    /// Same message for unknown email and wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Access token required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Failed to hash password: {0}")]
    Hashing(String),

    #[error("Failed to issue token: {0}")]
    TokenIssue(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

// =============================================================================
// API Error
// =============================================================================

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    Conflict,
    Validation,
    Unauthorized,
    Forbidden,
    Database,
    Render,
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict | ErrorCode::Validation => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::Database | ErrorCode::Render | ErrorCode::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<Value>,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.message,
            "code": self.code,
        });

        if let (Some(details), Some(map)) = (self.details, body.as_object_mut()) {
            map.insert("details".to_string(), details);
        }

        (self.code.status(), Json(body)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();

        match err {
            CoreError::CustomerNotFound | CoreError::InvoiceNotFound => {
                ApiError::new(ErrorCode::NotFound, message)
            }

            CoreError::DuplicateEmail | CoreError::EmailInUse | CoreError::DuplicateNumber => {
                ApiError::new(ErrorCode::Conflict, message)
            }

            CoreError::CustomerHasInvoices { invoice_count } => {
                ApiError::new(ErrorCode::Conflict, message)
                    .with_details(json!({ "invoiceCount": invoice_count }))
            }

            CoreError::TotalMismatch {
                declared,
                calculated,
            } => ApiError::validation(message).with_details(json!({
                "declared": declared,
                "calculated": calculated,
            })),

            CoreError::EmptyItems | CoreError::Validation(_) => ApiError::validation(message),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::NotFound { entity, .. } => {
                ApiError::new(ErrorCode::NotFound, format!("{} not found", entity))
            }

            DbError::UniqueViolation { constraint } => {
                let message = match constraint.as_str() {
                    "invoices.number" => CoreError::DuplicateNumber.to_string(),
                    "customers.email" => CoreError::DuplicateEmail.to_string(),
                    "users.email" => AuthError::EmailTaken.to_string(),
                    other => format!("Duplicate value for {}", other),
                };
                ApiError::new(ErrorCode::Conflict, message)
            }

            DbError::ForeignKeyViolation { .. } => {
                ApiError::new(ErrorCode::Conflict, "Referenced record is missing or still in use")
            }

            _ => {
                error!(error = %err, "Database error");
                ApiError::new(ErrorCode::Database, "Database error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();

        match err {
            AuthError::EmailTaken => ApiError::new(ErrorCode::Conflict, message),
            AuthError::WeakPassword { .. } => ApiError::validation(message),
            AuthError::InvalidCredentials | AuthError::MissingToken => {
                ApiError::new(ErrorCode::Unauthorized, message)
            }
            AuthError::InvalidOrExpiredToken => ApiError::new(ErrorCode::Forbidden, message),
            AuthError::UserNotFound => ApiError::new(ErrorCode::NotFound, message),
            AuthError::Hashing(_) | AuthError::TokenIssue(_) => {
                error!(error = %message, "Authentication internals failed");
                ApiError::internal("Authentication failed")
            }
            AuthError::Database(db) => ApiError::from(db),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        error!(error = %err, "PDF rendering failed");
        ApiError::new(ErrorCode::Render, "Failed to export invoice PDF")
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoice_core::Money;

    #[test]
    fn test_core_error_statuses() {
        assert_eq!(
            ApiError::from(CoreError::InvoiceNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(CoreError::DuplicateNumber).status(),
            StatusCode::BAD_REQUEST
        );

        let mismatch = ApiError::from(CoreError::TotalMismatch {
            declared: Money::from_cents(150_002),
            calculated: Money::from_cents(150_000),
        });
        assert_eq!(mismatch.code, ErrorCode::Validation);
        assert_eq!(mismatch.message, "Total amount does not match sum of items");
        assert!(mismatch.details.is_some());
    }

    #[test]
    fn test_unique_violation_uses_domain_message() {
        let err = ApiError::from(DbError::UniqueViolation {
            constraint: "invoices.number".to_string(),
        });
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.message, "Invoice number already exists");
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::MissingToken).message,
            "Access token required"
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidOrExpiredToken).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AuthError::WeakPassword { min: 6 }).message,
            "Password must be at least 6 characters long"
        );
    }

    #[test]
    fn test_internal_errors_hide_detail() {
        let err = ApiError::from(DbError::QueryFailed("disk I/O error".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Database error");
    }
}
