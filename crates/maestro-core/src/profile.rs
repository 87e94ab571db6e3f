//! Web-professional profiles.

use serde::{Deserialize, Serialize};

use crate::key::GrantKey;

/// Details about the web professional behind a grant key.
///
/// Transient: resolved on demand, never persisted by the grant manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// The key the profile was resolved from.
    pub key: GrantKey,

    /// Display name.
    pub name: String,

    /// Contact email.
    pub email: String,

    /// Free-form location, e.g. "Malibu, CA, USA".
    pub location: String,
}

impl Profile {
    /// Create a profile.
    pub fn new(
        key: GrantKey,
        name: impl Into<String>,
        email: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            key,
            name: name.into(),
            email: email.into(),
            location: location.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_field_names() {
        let profile = Profile::new(
            GrantKey::new("ABC123").unwrap(),
            "Tony Stark",
            "ironman@bh.test",
            "Malibu, CA, USA",
        );
        let json = serde_json::to_value(&profile).unwrap();
        let obj = json.as_object().unwrap();

        let mut fields: Vec<&str> = obj.keys().map(String::as_str).collect();
        fields.sort_unstable();
        assert_eq!(fields, vec!["email", "key", "location", "name"]);
        assert_eq!(obj["key"], "ABC123");
    }
}
