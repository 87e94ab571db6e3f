//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
///
/// "Not found" is never an error here: lookups return `Option` and writes
/// return an outcome enum. These variants are backend failures only.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),

    /// A blocking storage task failed to complete.
    #[error("storage task failed: {0}")]
    Task(String),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<maestro_core::CoreError> for StoreError {
    fn from(e: maestro_core::CoreError) -> Self {
        StoreError::InvalidData(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
