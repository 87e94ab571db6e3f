//! Error types for Maestro Core.

use thiserror::Error;

/// Errors raised while constructing core values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("grant key must not be empty")]
    EmptyKey,

    #[error("invalid user id: {0}")]
    InvalidUserId(String),

    #[error("invalid role name: {0:?}")]
    InvalidRole(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
