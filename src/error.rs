use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found error.
    #[error("Book not found: {0}")]
    NotFound(String),

    /// A catalog or detail read against the backend failed.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// A create, update or delete against the backend failed.
    #[error("Write failed: {0}")]
    Write(String),

    /// The long-running library scan failed.
    #[error("Scan failed: {0}")]
    Scan(String),

    /// The local state store could not be read or written.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, AppError>;
