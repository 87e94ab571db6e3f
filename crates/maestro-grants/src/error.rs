//! Error types for the grants module.

use thiserror::Error;

/// Errors that can occur while revoking a grant.
///
/// Each variant carries a stable machine-readable [`code`](RevokeError::code)
/// for callers that render their own messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RevokeError {
    /// The user holds no grant.
    #[error("User is not a Bluehost Maestro")]
    NotGranted,

    /// The stored key could not be deleted.
    #[error("Failed to revoke Maestro status")]
    RevokeFailed,
}

impl RevokeError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            RevokeError::NotGranted => "user_not_maestro",
            RevokeError::RevokeFailed => "maestro_revoke_failed",
        }
    }
}

/// Errors that can occur while resolving a key to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The resolver does not know this key.
    #[error("no profile found for the given key")]
    UnknownKey,

    /// The resolver could not be reached or answered badly.
    #[error("profile resolver unavailable: {0}")]
    Unavailable(String),
}

/// Result type for profile resolution.
pub type Result<T> = std::result::Result<T, ResolveError>;
