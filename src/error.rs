//! Application error types and their HTTP representation.
//!
//! Every failure the core can report is a distinct [`AppError`] variant with a
//! stable [`ErrorKind`], so transport code and tests match on the kind rather
//! than on message text.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::utils::deadline::DeadlineExceeded;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload carried under the `error` key.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Stable, machine-readable error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidTarget,
    InvalidAlias,
    AliasTaken,
    CodeSpaceExhausted,
    NotFound,
    Inactive,
    Expired,
    DuplicateCode,
    Validation,
    Backend,
}

impl ErrorKind {
    /// Returns the wire identifier used in error bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidTarget => "invalid_target",
            Self::InvalidAlias => "invalid_alias",
            Self::AliasTaken => "alias_taken",
            Self::CodeSpaceExhausted => "code_space_exhausted",
            Self::NotFound => "not_found",
            Self::Inactive => "inactive",
            Self::Expired => "expired",
            Self::DuplicateCode => "duplicate_code",
            Self::Validation => "validation_error",
            Self::Backend => "backend_error",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid target URL: {reason}")]
    InvalidTarget { reason: String },

    #[error("Invalid custom alias: {reason}")]
    InvalidAlias { reason: String },

    #[error("Custom alias '{alias}' is already taken")]
    AliasTaken { alias: String },

    #[error("Could not allocate a unique short code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },

    #[error("Short link '{key}' not found")]
    NotFound { key: String },

    #[error("Short link '{code}' is no longer active")]
    Inactive { code: String },

    #[error("Short link '{code}' has expired")]
    Expired { code: String },

    /// Unique-constraint violation reported by a repository on insert.
    #[error("Short code '{code}' already exists")]
    DuplicateCode { code: String },

    /// Malformed request payload rejected before reaching the core.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Durable-store failure or timeout on a required path.
    #[error("Backend failure: {message}")]
    Backend { message: String },
}

impl AppError {
    pub fn invalid_target(reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            reason: reason.into(),
        }
    }

    pub fn invalid_alias(reason: impl Into<String>) -> Self {
        Self::InvalidAlias {
            reason: reason.into(),
        }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTarget { .. } => ErrorKind::InvalidTarget,
            Self::InvalidAlias { .. } => ErrorKind::InvalidAlias,
            Self::AliasTaken { .. } => ErrorKind::AliasTaken,
            Self::CodeSpaceExhausted { .. } => ErrorKind::CodeSpaceExhausted,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Inactive { .. } => ErrorKind::Inactive,
            Self::Expired { .. } => ErrorKind::Expired,
            Self::DuplicateCode { .. } => ErrorKind::DuplicateCode,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Backend { .. } => ErrorKind::Backend,
        }
    }

    /// HTTP status the transport layer answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidTarget | ErrorKind::InvalidAlias | ErrorKind::Validation => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::AliasTaken | ErrorKind::DuplicateCode => StatusCode::CONFLICT,
            ErrorKind::Inactive | ErrorKind::Expired => StatusCode::GONE,
            ErrorKind::CodeSpaceExhausted => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Backend => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Value {
        match self {
            Self::InvalidTarget { reason } | Self::InvalidAlias { reason } => {
                json!({ "reason": reason })
            }
            Self::AliasTaken { alias } => json!({ "alias": alias }),
            Self::CodeSpaceExhausted { attempts } => json!({ "attempts": attempts }),
            Self::NotFound { key } => json!({ "key": key }),
            Self::Inactive { code } | Self::Expired { code } | Self::DuplicateCode { code } => {
                json!({ "code": code })
            }
            Self::Validation { details, .. } => details.clone(),
            // Backend messages may carry driver internals.
            Self::Backend { .. } => json!({}),
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let message = match self {
            Self::Backend { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        };

        ErrorInfo {
            code: self.kind().as_str(),
            message,
            details: self.details(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Backend { message } = &self {
            tracing::error!(error = %message, "Request failed with backend error");
        }

        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "Database error");
        AppError::backend(format!("database error: {e}"))
    }
}

impl From<DeadlineExceeded> for AppError {
    fn from(e: DeadlineExceeded) -> Self {
        AppError::backend(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or(Value::Null);
        AppError::bad_request("Request validation failed", details)
    }
}

/// Returns true when `e` is a unique-constraint violation on the given constraint.
pub fn is_unique_violation(e: &sqlx::Error, constraint: &str) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
}
