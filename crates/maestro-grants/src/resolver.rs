//! Profile resolution.
//!
//! A resolver turns a grant key into the profile of the web professional
//! who issued it. No remote protocol is defined here; a networked resolver
//! is a separate implementation of [`ProfileResolver`].

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use maestro_core::{GrantKey, Profile};

use crate::error::{ResolveError, Result};

/// Resolves grant keys to profiles.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait ProfileResolver: Send + Sync {
    /// Resolve a key to a profile.
    async fn resolve(&self, key: &GrantKey) -> Result<Profile>;
}

/// Placeholder resolver that answers every key with the same profile.
///
/// The returned profile echoes the requested key.
#[derive(Debug, Clone)]
pub struct StaticProfileResolver {
    name: String,
    email: String,
    location: String,
}

impl StaticProfileResolver {
    /// Create a resolver with custom placeholder details.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            location: location.into(),
        }
    }
}

impl Default for StaticProfileResolver {
    fn default() -> Self {
        Self::new("Tony Stark", "ironman@bh.test", "Malibu, CA, USA")
    }
}

#[async_trait]
impl ProfileResolver for StaticProfileResolver {
    async fn resolve(&self, key: &GrantKey) -> Result<Profile> {
        tracing::debug!("resolving profile from placeholder resolver");
        Ok(Profile::new(
            key.clone(),
            self.name.clone(),
            self.email.clone(),
            self.location.clone(),
        ))
    }
}

/// Resolver backed by an in-memory table of known keys.
pub struct MemoryProfileResolver {
    profiles: RwLock<HashMap<GrantKey, Profile>>,
}

impl MemoryProfileResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }

    /// Register a profile under its own key, replacing any previous entry.
    pub fn insert(&self, profile: Profile) -> Result<()> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|e| ResolveError::Unavailable(e.to_string()))?;
        profiles.insert(profile.key.clone(), profile);
        Ok(())
    }
}

impl Default for MemoryProfileResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Profile> for MemoryProfileResolver {
    fn from_iter<I: IntoIterator<Item = Profile>>(iter: I) -> Self {
        let profiles = iter
            .into_iter()
            .map(|profile| (profile.key.clone(), profile))
            .collect();
        Self {
            profiles: RwLock::new(profiles),
        }
    }
}

#[async_trait]
impl ProfileResolver for MemoryProfileResolver {
    async fn resolve(&self, key: &GrantKey) -> Result<Profile> {
        let profiles = self
            .profiles
            .read()
            .map_err(|e| ResolveError::Unavailable(e.to_string()))?;
        profiles.get(key).cloned().ok_or(ResolveError::UnknownKey)
    }
}
