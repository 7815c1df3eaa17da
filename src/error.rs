//! Error types for focusflow.

use thiserror::Error;

/// Main error type for focusflow operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid time '{0}': expected HH:MM (24-hour)")]
    InvalidTime(String),

    #[error("Invalid day '{0}': expected Monday..Sunday")]
    InvalidDay(String),

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Task id already exists: {0}")]
    DuplicateId(String),

    #[error("Task {0} not found")]
    TaskNotFound(String),

    #[error("Id prefix '{0}' matches more than one task")]
    AmbiguousId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for focusflow operations.
pub type Result<T> = std::result::Result<T, Error>;
