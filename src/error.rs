use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::error::Error;
use std::fmt;

use crate::repository::RepoError;
use crate::validation::FieldErrors;

/// The primary error type for the HTTP layer.
///
/// Every failure a handler can produce ends up here, and each variant fixes
/// both the response status and the level it is logged at.
#[derive(Debug)]
pub enum AppError {
    /// Malformed body or path parameter.
    BadRequest(String),
    /// One or more customer fields failed validation.
    Validation(FieldErrors),
    /// The candidate collides with an existing customer.
    ///
    /// Answered with 400, not 409, for compatibility with existing clients.
    DuplicateKey(String),
    /// For when a requested resource is not found.
    NotFound(String),
    /// For errors related to database operations. The message is logged, never returned.
    Database(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Validation(errors) => write!(f, "Validation failed: {}", errors),
            AppError::DuplicateKey(msg) => write!(f, "Duplicate key: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::DuplicateKey(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Logs the failure against the request's correlation id and hands it back.
    ///
    /// Client mistakes are warnings, storage failures are errors.
    pub fn logged(self, request_id: &str) -> Self {
        match &self {
            AppError::Database(_) => tracing::error!("{}: {}", request_id, self),
            AppError::NotFound(_) => tracing::info!("{}: {}", request_id, self),
            _ => tracing::warn!("{}: {}", request_id, self),
        }
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_code, error_message, details) = match self {
            AppError::BadRequest(msg) => ("BAD_REQUEST", msg, None),
            AppError::Validation(errors) => {
                let message = errors.to_string();
                ("VALIDATION_ERROR", message, Some(json!(errors)))
            }
            AppError::DuplicateKey(_) => {
                ("DUPLICATE_KEY", "A customer with the same fields already exists".to_string(), None)
            }
            AppError::NotFound(msg) => ("NOT_FOUND", msg, None),
            AppError::Database(_) => ("DATABASE_ERROR", "A database error occurred".to_string(), None),
        };

        let mut body = json!({
            "error": {
                "code": error_code,
                "message": error_message,
            },
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        if let Some(details) = details {
            body["error"]["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::DuplicateKey(_) => AppError::DuplicateKey(err.to_string()),
            RepoError::NotFound => AppError::NotFound("Customer not found".to_string()),
            RepoError::Storage { .. } => AppError::Database(err.to_string()),
        }
    }
}

/// A type alias for `Result<T, AppError>`, used throughout the handlers.
pub type AppResult<T> = Result<T, AppError>;
