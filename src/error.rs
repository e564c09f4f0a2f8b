use thiserror::Error;

/// Main error type for Notegraph
#[derive(Error, Debug)]
pub enum NotegraphError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid pattern in an extraction table
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Note not found
    #[error("Note not found: {0}")]
    NoteNotFound(i64),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using NotegraphError
pub type Result<T> = std::result::Result<T, NotegraphError>;
