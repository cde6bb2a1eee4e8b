//! Error types for Visitor Desk

use serde::Serialize;
use thiserror::Error;

/// Error codes reported to screens alongside the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    StoreFailure = 3,
    NoSuchVisitor = 5,
    Duplicate = 8,
    BadValue = 18,
    BadConfiguration = 22,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error body handed to the screen that triggered the operation
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    /// Error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound(_) => ErrorCode::NoSuchVisitor,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::Conflict(_) => ErrorCode::Duplicate,
            AppError::Store(_) => ErrorCode::StoreFailure,
            AppError::Config(_) => ErrorCode::BadConfiguration,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }

    /// Build the displayable report. Store and internal failures are logged
    /// and replaced by a generic message.
    pub fn report(&self) -> ErrorReport {
        let message = match self {
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Store(msg) => {
                tracing::error!("Store error: {}", msg);
                "The visitor service is unavailable".to_string()
            }
            AppError::Config(e) => e.to_string(),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal error".to_string()
            }
        };

        let code = self.code();
        ErrorReport {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid value for {}", field),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join(", "))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Validation(format!("Malformed document: {}", e))
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
