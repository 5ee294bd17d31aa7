//! Domain error types for the catalog admin server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.
//! Every variant renders as a JSON body `{ "error": ..., "details": ... }`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

/// One failed validation rule on a request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Resource not found; the message is returned as-is
    #[error("{0}")]
    NotFound(String),

    /// Invalid input data
    #[error("{0}")]
    InvalidInput(String),

    /// Request body failed field validation
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Missing or unusable credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Unique constraint would be violated
    #[error("{0}")]
    Conflict(String),

    /// Upload exceeded a configured limit
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Operation failed; `details` carries the underlying cause
    #[error("{message}: {details}")]
    Internal { message: String, details: String },

    /// Uploads directory operation failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Shorthand for an internal error that exposes its cause.
    pub fn internal(message: impl Into<String>, details: impl fmt::Display) -> Self {
        AppError::Internal {
            message: message.into(),
            details: details.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Database(err_str) => {
                tracing::error!("Database error: {}", err_str);
                ErrorResponse::new("An internal database error occurred")
            }
            AppError::Storage(err_str) => {
                tracing::error!("Storage error: {}", err_str);
                ErrorResponse::new("An internal storage error occurred")
            }
            AppError::Internal { message, details } => {
                tracing::error!("{}: {}", message, details);
                ErrorResponse {
                    error: message.clone(),
                    details: Some(serde_json::Value::String(details.clone())),
                }
            }
            AppError::Validation(fields) => ErrorResponse {
                error: self.to_string(),
                details: serde_json::to_value(fields).ok(),
            },
            _ => ErrorResponse::new(self.to_string()),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {}", self.error, details),
            None => write!(f, "{}", self.error),
        }
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::RecordNotFound(msg) => AppError::NotFound(msg),
            sea_orm::DbErr::RecordNotUpdated => AppError::NotFound("Record not found".to_string()),
            other => AppError::Database(other.to_string()),
        }
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("Invalid UUID: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::internal("Failed to process password", err)
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        AppError::internal("Background task failed", err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field).then(a.message.cmp(&b.message)));
        AppError::Validation(fields)
    }
}
