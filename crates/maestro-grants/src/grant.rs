//! Outcomes of grant operations.
//!
//! Each write operation reports what actually happened instead of a bare
//! boolean, so "nothing to do" is never confused with "failed".

use maestro_core::{MetaId, Role};

/// Outcome of granting a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    /// The key was stored under the given attribute row.
    Granted(MetaId),
    /// The user already had a key; nothing was overwritten.
    AlreadyGranted,
    /// The anonymous user cannot hold a key; the store was not touched.
    Refused,
}

impl GrantOutcome {
    /// The stored row id, if a key was stored.
    pub fn meta_id(&self) -> Option<MetaId> {
        match self {
            GrantOutcome::Granted(id) => Some(*id),
            GrantOutcome::AlreadyGranted | GrantOutcome::Refused => None,
        }
    }
}

/// Outcome of updating a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUpdate {
    /// No key existed; a fresh one was stored.
    Created(MetaId),
    /// The existing key was replaced.
    Replaced,
    /// The stored key already equals the new key.
    Unchanged,
    /// A concurrent writer changed or removed the key first.
    Conflict,
    /// The anonymous user cannot hold a key; the store was not touched.
    Refused,
}

impl KeyUpdate {
    /// Whether the user's key now equals the requested key.
    pub fn is_success(&self) -> bool {
        !matches!(self, KeyUpdate::Conflict | KeyUpdate::Refused)
    }
}

/// What happened to the user's role after a successful revoke.
///
/// Demotion is best-effort: its outcome is reported here and never turned
/// into a revoke failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Demotion {
    /// The user now holds the given role.
    Demoted(Role),
    /// The user directory no longer knows the user.
    UserMissing,
    /// The directory failed while changing the role.
    Failed(String),
}

impl Demotion {
    /// Whether the role change took effect.
    pub fn is_demoted(&self) -> bool {
        matches!(self, Demotion::Demoted(_))
    }
}

/// Report of a successful revoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeReport {
    /// Outcome of the role demotion that follows the key deletion.
    pub demotion: Demotion,
}
