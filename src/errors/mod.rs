//! Error handling module for the Rotabot backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::slack::SlackError;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const INVALID_METADATA: &str = "INVALID_METADATA";
    pub const UNKNOWN_VIEW: &str = "UNKNOWN_VIEW";
    pub const UNKNOWN_ACTION: &str = "UNKNOWN_ACTION";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const SLACK_ERROR: &str = "SLACK_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Request signature check failed
    Unauthorized(String),
    /// View private metadata could not be decoded
    InvalidMetadata(String),
    /// Interaction references a view callback ID we do not know
    UnknownView(String),
    /// Interaction references an action the view does not handle
    UnknownAction(String),
    /// Unique constraint violated
    AlreadyExists(String),
    /// Resource not found
    NotFound(String),
    /// Malformed request
    BadRequest(String),
    /// Database error
    Database(String),
    /// Slack Web API error
    Slack(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    ///
    /// Slack cannot act on the details of a broken interaction, so everything
    /// except authentication and decoding failures answers 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidMetadata(_)
            | AppError::UnknownView(_)
            | AppError::UnknownAction(_)
            | AppError::AlreadyExists(_)
            | AppError::NotFound(_)
            | AppError::Database(_)
            | AppError::Slack(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::InvalidMetadata(_) => codes::INVALID_METADATA,
            AppError::UnknownView(_) => codes::UNKNOWN_VIEW,
            AppError::UnknownAction(_) => codes::UNKNOWN_ACTION,
            AppError::AlreadyExists(_) => codes::ALREADY_EXISTS,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Slack(_) => codes::SLACK_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg)
            | AppError::InvalidMetadata(msg)
            | AppError::UnknownView(msg)
            | AppError::UnknownAction(msg)
            | AppError::AlreadyExists(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Database(msg)
            | AppError::Slack(msg)
            | AppError::Internal(msg) => msg.clone(),
        }
    }

    /// Whether the error is reported to Sentry and hidden from the caller.
    pub fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("Row not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::AlreadyExists(format!("Unique constraint violated: {}", db_err))
            }
            _ => AppError::Database(format!("Database error: {}", err)),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl From<SlackError> for AppError {
    fn from(err: SlackError) -> Self {
        AppError::Slack(err.to_string())
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        // Don't expose internal error details to Slack
        let message = if error.is_internal() {
            "Unexpected error occurred".to_string()
        } else {
            error.message()
        };

        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The only place an internal error is logged. The Sentry tracing
        // layer turns this event into the error's single report.
        if self.is_internal() {
            tracing::error!(
                error = &self as &dyn std::error::Error,
                code = self.error_code(),
                "unexpected_error"
            );
        }

        let status = self.status_code();
        (status, Json(ErrorResponse::new(&self))).into_response()
    }
}
