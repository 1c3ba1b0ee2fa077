// src/error.rs

//! Unified error handling for the reconciliation pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction or transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote feed could not be fetched or parsed
    #[error("Feed error for {context}: {message}")]
    Feed { context: String, message: String },

    /// A single feed record is structurally unusable
    #[error("Unusable feed record {id}: {message}")]
    Record { id: String, message: String },

    /// The lost-item store rejected a read or write
    #[error("Store error: {0}")]
    Store(String),

    /// The mail capability failed to accept a message
    #[error("Mail error: {0}")]
    Mail(String),

    /// A scheduled job ended abnormally
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl AppError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a feed error with request context.
    pub fn feed(context: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Feed {
            context: context.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a per-record error. Records with no usable id log as "?".
    pub fn record(id: Option<&str>, message: impl Into<String>) -> Self {
        Self::Record {
            id: id.filter(|s| !s.is_empty()).unwrap_or("?").to_string(),
            message: message.into(),
        }
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create a mail error.
    pub fn mail(message: impl fmt::Display) -> Self {
        Self::Mail(message.to_string())
    }
}
