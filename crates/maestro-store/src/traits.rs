//! Store traits: the abstract interfaces for user attributes and users.
//!
//! The grant manager is storage-agnostic. Implementations include SQLite
//! (primary) and in-memory (for tests).

use async_trait::async_trait;
use maestro_core::{MetaId, Role, User, UserId};

use crate::error::Result;

/// Result of adding an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddResult {
    /// The attribute row was stored.
    Added(MetaId),
    /// A unique add found an existing attribute with the same name.
    AlreadyExists,
}

impl AddResult {
    /// The id of the stored row, if one was added.
    pub fn meta_id(&self) -> Option<MetaId> {
        match self {
            AddResult::Added(id) => Some(*id),
            AddResult::AlreadyExists => None,
        }
    }
}

/// Result of updating an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    /// The stored value was replaced.
    Updated,
    /// The stored value already equals the new value.
    Unchanged,
    /// The stored value did not match the expected previous value.
    Conflict,
    /// No attribute with that name exists for the user.
    Missing,
}

/// Per-user named attribute storage.
///
/// Attribute names may hold several rows when added non-uniquely; reads
/// return the oldest row, deletes remove all of them.
#[async_trait]
pub trait AttributeStore: Send + Sync {
    /// Get the value of an attribute, or `None` if it is not set.
    async fn get_attribute(&self, user: UserId, name: &str) -> Result<Option<String>>;

    /// Add an attribute row.
    ///
    /// With `unique` set, the add is refused with `AlreadyExists` when the
    /// user already has an attribute of that name. The check and the insert
    /// are atomic.
    async fn add_attribute(
        &self,
        user: UserId,
        name: &str,
        value: &str,
        unique: bool,
    ) -> Result<AddResult>;

    /// Overwrite an attribute.
    ///
    /// When `expected` is given, only rows whose value equals it are
    /// written (compare-and-swap by previous value); if none match the result
    /// is `Conflict`.
    async fn update_attribute(
        &self,
        user: UserId,
        name: &str,
        value: &str,
        expected: Option<&str>,
    ) -> Result<UpdateResult>;

    /// Delete every row of an attribute.
    ///
    /// Returns `false` if there was nothing to delete.
    async fn delete_attribute(&self, user: UserId, name: &str) -> Result<bool>;
}

/// The user directory: existence and roles.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up a user. `None` means the user does not exist.
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Set a user's role.
    ///
    /// Returns `false` if the user does not exist.
    async fn set_role(&self, id: UserId, role: &Role) -> Result<bool>;

    /// Create a user and return its id.
    async fn insert_user(&self, login: &str, role: &Role) -> Result<UserId>;

    /// Delete a user together with all of the user's attributes.
    ///
    /// Returns `false` if the user did not exist.
    async fn delete_user(&self, id: UserId) -> Result<bool>;
}
