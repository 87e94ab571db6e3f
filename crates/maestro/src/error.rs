//! Error types for the grant manager.

use maestro_core::CoreError;
use maestro_grants::{ResolveError, RevokeError};
use maestro_store::StoreError;
use thiserror::Error;

/// Errors that can occur during grant manager operations.
#[derive(Debug, Error)]
pub enum MaestroError {
    /// Storage backend failure.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Revoke was refused or failed.
    #[error("{0}")]
    Revoke(#[from] RevokeError),

    /// Profile resolution failed.
    #[error("profile resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Invalid core value.
    #[error("invalid value: {0}")]
    Core(#[from] CoreError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MaestroError {
    /// Stable error code for revoke failures, if this is one.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            MaestroError::Revoke(e) => Some(e.code()),
            _ => None,
        }
    }
}

/// Result type for grant manager operations.
pub type Result<T> = std::result::Result<T, MaestroError>;
