//! Registry error types.

use thiserror::Error;

/// Errors surfaced by store operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Malformed request shape or email.
    #[error("{0}")]
    Validation(String),

    /// Referenced teacher or student does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Anything the database layer reports, rollbacks included.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
