//! Application error handling.
//!
//! Wraps domain errors with the failures that only exist at the service
//! boundary (configuration, background tasks) and maps each to a stable code.

use domain::DomainError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Input
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Validation(String),

    // Authentication
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is inactive")]
    Inactive,

    // Setup
    #[error("Configuration error: {0}")]
    Config(String),

    // Internal
    #[error("Internal error")]
    Internal(String),
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Inactive => "ACCOUNT_INACTIVE",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidArgument(msg) | AppError::Validation(msg) => msg.clone(),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::Hashing(msg) => AppError::Internal(msg),
            DomainError::InvalidCredentials => AppError::InvalidCredentials,
            DomainError::Inactive => AppError::Inactive,
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
