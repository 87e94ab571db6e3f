//! Strong type definitions for Maestro.
//!
//! Identifiers are newtypes so a user id can never be passed where an
//! attribute row id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Identifier of a site user.
///
/// Real users are numbered from 1. [`UserId::ANONYMOUS`] stands for a
/// visitor who is not logged in and never exists in the user directory.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    /// The anonymous visitor.
    pub const ANONYMOUS: Self = Self(0);

    /// Create a user id from its raw value.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Whether this is the anonymous visitor.
    pub const fn is_anonymous(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for UserId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| CoreError::InvalidUserId(s.to_string()))
    }
}

/// Identifier assigned by an attribute store to a stored attribute row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetaId(pub i64);

impl fmt::Display for MetaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_parse() {
        assert_eq!("42".parse::<UserId>().unwrap(), UserId(42));
        assert_eq!(" 7 ".parse::<UserId>().unwrap(), UserId(7));
        assert!(matches!(
            "abc".parse::<UserId>(),
            Err(CoreError::InvalidUserId(_))
        ));
        assert!("-1".parse::<UserId>().is_err());
    }

    #[test]
    fn test_anonymous() {
        assert!(UserId::ANONYMOUS.is_anonymous());
        assert!(!UserId::new(1).is_anonymous());
    }

    #[test]
    fn test_user_id_display() {
        assert_eq!(format!("{}", UserId(42)), "42");
        assert_eq!(format!("{:?}", UserId(42)), "UserId(42)");
    }
}
