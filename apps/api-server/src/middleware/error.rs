//! Error handling - RFC 7807 compliant responses.
//!
//! Every deeper-layer failure (store, file system, domain) is mapped here
//! to one of the taxonomy kinds: permission, validation, not-found,
//! conflict, or internal. Internal details are logged, never echoed.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use pinboard_shared::ErrorResponse;
use std::fmt;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    Conflict(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Forbidden(detail) => ErrorResponse::forbidden(detail),
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::Internal(detail) => {
                // Log internal errors; the response body stays generic.
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

// Conversion from domain errors
impl From<pinboard_core::error::DomainError> for AppError {
    fn from(err: pinboard_core::error::DomainError) -> Self {
        match err {
            pinboard_core::error::DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            pinboard_core::error::DomainError::Validation(msg) => AppError::BadRequest(msg),
            pinboard_core::error::DomainError::Duplicate(msg) => AppError::Conflict(msg),
            pinboard_core::error::DomainError::Unauthorized => AppError::Unauthorized,
            pinboard_core::error::DomainError::Forbidden(msg) => AppError::Forbidden(msg),
            pinboard_core::error::DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<pinboard_core::error::RepoError> for AppError {
    fn from(err: pinboard_core::error::RepoError) -> Self {
        match err {
            pinboard_core::error::RepoError::NotFound => {
                AppError::NotFound("Resource not found".to_string())
            }
            pinboard_core::error::RepoError::Constraint(msg) => AppError::Conflict(msg),
            pinboard_core::error::RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            pinboard_core::error::RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<pinboard_core::ports::ImageStoreError> for AppError {
    fn from(err: pinboard_core::ports::ImageStoreError) -> Self {
        match err {
            pinboard_core::ports::ImageStoreError::UnsupportedType
            | pinboard_core::ports::ImageStoreError::EmptyPayload => {
                AppError::BadRequest(err.to_string())
            }
            pinboard_core::ports::ImageStoreError::Io(msg) => {
                tracing::error!("Image storage error: {}", msg);
                AppError::Internal("Image storage error".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
