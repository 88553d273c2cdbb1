//! Error types for the lending ledger

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable numeric error codes returned to the connectivity layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    Unauthenticated = 2,
    PermissionDenied = 3,
    AlreadyRegistered = 4,
    NoSuchBook = 5,
    InvalidArgument = 6,
    BookNotAvailable = 7,
    AlreadyBorrowed = 8,
    NotBorrowed = 9,
    Conflict = 10,
}

/// Ledger error taxonomy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Already borrowed: {0}")]
    AlreadyBorrowed(String),

    #[error("Not borrowed: {0}")]
    NotBorrowed(String),

    /// The transaction lost a race with another commit; resubmitting is safe.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Unauthenticated(_) => ErrorCode::Unauthenticated,
            AppError::PermissionDenied(_) => ErrorCode::PermissionDenied,
            AppError::AlreadyRegistered(_) => ErrorCode::AlreadyRegistered,
            AppError::NotFound(_) => ErrorCode::NoSuchBook,
            AppError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            AppError::Unavailable(_) => ErrorCode::BookNotAvailable,
            AppError::AlreadyBorrowed(_) => ErrorCode::AlreadyBorrowed,
            AppError::NotBorrowed(_) => ErrorCode::NotBorrowed,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }

    /// Only substrate conflicts may be retried by resubmitting the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::InvalidArgument(errors.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    pub retryable: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::PermissionDenied(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::AlreadyRegistered(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unavailable(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::AlreadyBorrowed(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::NotBorrowed(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Conflict(msg) => {
                tracing::warn!("Transaction conflict: {}", msg);
                (StatusCode::CONFLICT, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let code = self.code();
        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            retryable: self.is_retryable(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for ledger operations
pub type AppResult<T> = Result<T, AppError>;
