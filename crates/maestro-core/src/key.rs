//! Grant keys.
//!
//! A grant key is the secret a web professional hands to a site owner.
//! An empty value is never a valid key: the store treats a stored empty
//! value as corrupt and heals it on read.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// A non-empty secret grant key.
///
/// `Debug` output is redacted so keys do not end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GrantKey(String);

impl GrantKey {
    /// Create a grant key, rejecting the empty string.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(CoreError::EmptyKey);
        }
        Ok(Self(key))
    }

    /// Interpret a raw stored value.
    ///
    /// Returns `None` for the empty string.
    pub fn from_stored(value: &str) -> Option<Self> {
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GrantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GrantKey(<{} chars>)", self.0.chars().count())
    }
}

impl AsRef<str> for GrantKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for GrantKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for GrantKey {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<GrantKey> for String {
    fn from(key: GrantKey) -> Self {
        key.0
    }
}

impl PartialEq<str> for GrantKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for GrantKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_key_rejected() {
        assert_eq!(GrantKey::new(""), Err(CoreError::EmptyKey));
        assert!(GrantKey::from_stored("").is_none());
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = GrantKey::new("ABC123").unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains("ABC123"));
        assert_eq!(debug, "GrantKey(<6 chars>)");
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        let ok: GrantKey = serde_json::from_str("\"XYZ789\"").unwrap();
        assert_eq!(ok, "XYZ789");
        assert!(serde_json::from_str::<GrantKey>("\"\"").is_err());
    }

    proptest! {
        #[test]
        fn test_non_empty_values_are_keys(value in ".{1,64}") {
            let key = GrantKey::from_stored(&value).unwrap();
            prop_assert_eq!(key.as_str(), value.as_str());
        }
    }
}
