//! Error types for OracleDrive

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriveError {
    #[error("storage error during {operation}: {message}")]
    Storage { operation: String, message: String },

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("invalid file: {0}")]
    InvalidFile(String),

    #[error("metadata service error: {0}")]
    Metadata(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DriveError>;

impl DriveError {
    pub fn storage(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found(id: impl std::fmt::Display) -> Self {
        Self::FileNotFound(id.to_string())
    }

    pub fn invalid_file(message: impl Into<String>) -> Self {
        Self::InvalidFile(message.into())
    }

    pub fn metadata(message: impl Into<String>) -> Self {
        Self::Metadata(message.into())
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
