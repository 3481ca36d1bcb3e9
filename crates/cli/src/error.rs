//! Error types for CLI operations.

use dispatcher::DispatchError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Message file could not be read or parsed
    #[error("Invalid message file {path}: {message}")]
    InvalidMessage { path: String, message: String },

    /// Dispatch ended in a caller-visible failure
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_message(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidMessage {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
