//! Users and roles as seen by the grant manager.
//!
//! The user directory owns users; this crate only describes them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::types::UserId;

/// A site role name, e.g. `administrator` or `subscriber`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Role(String);

impl Role {
    /// Full site administration.
    pub const ADMINISTRATOR: &'static str = "administrator";

    /// Read-only member; the role a revoked web professional is demoted to.
    pub const SUBSCRIBER: &'static str = "subscriber";

    /// Create a role from its name.
    ///
    /// Role names are lowercase slugs: ASCII letters, digits, `_` and `-`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
        if !valid {
            return Err(CoreError::InvalidRole(name));
        }
        Ok(Self(name))
    }

    /// The `administrator` role.
    pub fn administrator() -> Self {
        Self(Self::ADMINISTRATOR.to_string())
    }

    /// The `subscriber` role.
    pub fn subscriber() -> Self {
        Self(Self::SUBSCRIBER.to_string())
    }

    /// Get the role name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.0
    }
}

/// A user known to the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The user's id.
    pub id: UserId,

    /// Login name.
    pub login: String,

    /// Current role.
    pub role: Role,
}

impl User {
    /// Create a user record.
    pub fn new(id: UserId, login: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            login: login.into(),
            role,
        }
    }

    /// Check whether the user currently holds the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_str() == role
    }
}
