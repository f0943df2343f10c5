//! Error handling for the turf booking server
//!
//! Every failure maps to one HTTP status and a stable error code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::FieldError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Request errors
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Booking has already been processed")]
    AlreadyProcessed,

    // Authentication and authorization
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict on {resource}: {message}")]
    Conflict { resource: String, message: String },

    // External service errors
    #[error("Upstream {service} error: {message}")]
    Upstream { service: String, message: String },

    #[error("Listings unavailable: {0}")]
    ServiceUnavailable(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn conflict(resource: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Conflict {
            resource: resource.into(),
            message: message.into(),
        }
    }

    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Upstream {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::AlreadyProcessed => StatusCode::BAD_REQUEST,
            AppError::InvalidCredential(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::AlreadyProcessed => "ALREADY_PROCESSED",
            AppError::InvalidCredential(_) => "INVALID_CREDENTIAL",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::Upstream { .. } => "UPSTREAM_ERROR",
            AppError::ServiceUnavailable(_) => "LISTINGS_UNAVAILABLE",
            AppError::Database(_) => "STORE_ERROR",
            AppError::Internal(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Failures of our own or of a dependency, as opposed to a bad request
    fn is_server_fault(&self) -> bool {
        self.status().is_server_error()
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (message, field) = match &self {
            AppError::Validation { field, message } => (message.clone(), Some(field.clone())),
            AppError::AlreadyProcessed => ("booking has already been processed".to_string(), None),
            AppError::InvalidCredential(msg) => (msg.clone(), None),
            AppError::Forbidden(msg) => (msg.clone(), None),
            AppError::NotFound(resource) => (format!("{} not found", resource), None),
            AppError::Conflict { resource, message } => (message.clone(), Some(resource.clone())),
            AppError::Upstream { service, .. } => {
                (format!("The {} service failed, please retry", service), None)
            }
            AppError::ServiceUnavailable(_) => (
                "Listings are temporarily unavailable".to_string(),
                None,
            ),
            AppError::Database(_) => ("A storage error occurred".to_string(), None),
            AppError::Internal(_) | AppError::InternalError(_) => {
                ("An internal server error occurred".to_string(), None)
            }
        };

        if self.is_server_fault() {
            tracing::error!(code = self.code(), "Error: {:?}", self);
        } else {
            tracing::debug!(code = self.code(), "Request rejected: {}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
                field,
            },
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        AppError::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(name, _)| *name);

        match fields.first() {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                AppError::Validation {
                    field: field.to_string(),
                    message,
                }
            }
            None => AppError::validation("request", "Invalid request"),
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
