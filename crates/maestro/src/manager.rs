//! The grant manager: unified API for Maestro access grants.
//!
//! `Maestro` brings together the attribute store, the user directory and
//! the profile resolver. Every operation names its target user explicitly;
//! see [`crate::context`] for resolving the current user of a request.

use std::sync::Arc;

use tracing::{debug, info, warn};

use maestro_core::{GrantKey, Profile, UserId};
use maestro_grants::{
    Demotion, Effect, Event, GrantOutcome, GrantState, KeyUpdate, ProfileResolver, RevokeError,
    RevokePlan, RevokeReport, StaticProfileResolver, UpdatePlan,
};
use maestro_store::{AddResult, AttributeStore, UpdateResult, UserDirectory};

use crate::config::MaestroConfig;
use crate::context::{RequestContext, RequestScope};
use crate::error::Result;

/// The grant manager.
///
/// Owns the mapping from user to optional grant key and performs the
/// grant, update and revoke transitions against the store.
pub struct Maestro<S, R = StaticProfileResolver> {
    /// The storage backend (attributes and users).
    store: Arc<S>,
    /// Resolves keys to web-professional profiles.
    resolver: R,
    /// Configuration.
    config: MaestroConfig,
}

impl<S> Maestro<S, StaticProfileResolver>
where
    S: AttributeStore + UserDirectory,
{
    /// Create a manager with the default configuration and the placeholder
    /// profile resolver.
    pub fn with_store(store: S) -> Self {
        Self {
            store: Arc::new(store),
            resolver: StaticProfileResolver::default(),
            config: MaestroConfig::default(),
        }
    }
}

impl<S, R> Maestro<S, R>
where
    S: AttributeStore + UserDirectory,
    R: ProfileResolver,
{
    /// Create a new grant manager.
    pub fn new(store: S, resolver: R, config: MaestroConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: Arc::new(store),
            resolver,
            config,
        })
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &MaestroConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Key Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Store a grant key for a user unless one already exists.
    ///
    /// Never overwrites: if the user already has a key the result is
    /// [`GrantOutcome::AlreadyGranted`]. The user's existence is not checked,
    /// but the anonymous user is [`GrantOutcome::Refused`].
    pub async fn grant(&self, user: UserId, key: &GrantKey) -> Result<GrantOutcome> {
        if user.is_anonymous() {
            debug!("anonymous user cannot be granted");
            return Ok(GrantOutcome::Refused);
        }

        let added = self
            .store
            .add_attribute(user, &self.config.meta_key, key.as_str(), true)
            .await?;

        match added {
            AddResult::Added(meta_id) => {
                info!(user = %user, meta_id = %meta_id, "maestro key granted");
                Ok(GrantOutcome::Granted(meta_id))
            }
            AddResult::AlreadyExists => {
                debug!(user = %user, "maestro key already present, grant skipped");
                Ok(GrantOutcome::AlreadyGranted)
            }
        }
    }

    /// Get a user's grant key.
    ///
    /// A stored empty value is deleted and reported as `None`.
    pub async fn get_key(&self, user: UserId) -> Result<Option<GrantKey>> {
        Ok(self.read_state(user).await?.into_key())
    }

    /// Replace a user's grant key, or store one if none exists.
    ///
    /// The overwrite only succeeds if the stored key still equals the one
    /// just read; a concurrent writer that got there first turns this call
    /// into [`KeyUpdate::Conflict`]. No retry is attempted.
    pub async fn update_key(&self, user: UserId, key: &GrantKey) -> Result<KeyUpdate> {
        if user.is_anonymous() {
            debug!("anonymous user cannot be granted");
            return Ok(KeyUpdate::Refused);
        }

        let state = self.read_state(user).await?;
        let meta_key = &self.config.meta_key;

        let update = match state.plan_update(key.clone()) {
            UpdatePlan::Store(key) => match self.grant(user, &key).await? {
                GrantOutcome::Granted(meta_id) => KeyUpdate::Created(meta_id),
                GrantOutcome::AlreadyGranted => KeyUpdate::Conflict,
                GrantOutcome::Refused => KeyUpdate::Refused,
            },
            UpdatePlan::Replace { previous, next } => {
                let updated = self
                    .store
                    .update_attribute(user, meta_key, next.as_str(), Some(previous.as_str()))
                    .await?;
                match updated {
                    UpdateResult::Updated => KeyUpdate::Replaced,
                    UpdateResult::Unchanged => KeyUpdate::Unchanged,
                    UpdateResult::Conflict | UpdateResult::Missing => KeyUpdate::Conflict,
                }
            }
        };

        match update {
            KeyUpdate::Replaced => info!(user = %user, "maestro key replaced"),
            KeyUpdate::Conflict => warn!(user = %user, "maestro key changed concurrently, update lost"),
            KeyUpdate::Created(_) | KeyUpdate::Unchanged | KeyUpdate::Refused => {}
        }

        Ok(update)
    }

    /// Delete a user's grant key without touching their role.
    ///
    /// Returns `false` if there was no key.
    pub async fn delete_key(&self, user: UserId) -> Result<bool> {
        if user.is_anonymous() {
            return Ok(false);
        }

        let deleted = self
            .store
            .delete_attribute(user, &self.config.meta_key)
            .await?;
        debug!(user = %user, deleted, "maestro key delete");
        Ok(deleted)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Access Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Check whether a user holds a grant.
    ///
    /// Unknown users are never granted; their attributes are not read.
    pub async fn is_granted(&self, user: UserId) -> Result<bool> {
        if !self.user_exists(user).await? {
            debug!(user = %user, "unknown user cannot hold a grant");
            return Ok(false);
        }
        Ok(self.get_key(user).await?.is_some())
    }

    /// Revoke a user's grant: delete the key, then demote the user.
    ///
    /// Fails with [`RevokeError::NotGranted`] unless the user currently
    /// holds a grant, and with [`RevokeError::RevokeFailed`] if the key
    /// could not be deleted, whether nothing was removed or the store failed.
    /// Demotion happens only after a successful delete and its outcome is
    /// reported in [`RevokeReport::demotion`].
    pub async fn revoke(&self, user: UserId) -> Result<RevokeReport> {
        let state = if self.user_exists(user).await? {
            self.read_state(user).await?
        } else {
            GrantState::Ungranted
        };

        if let RevokePlan::Reject(e) = state.plan_revoke() {
            debug!(user = %user, "revoke refused: {}", e);
            return Err(e.into());
        }

        match self.store.delete_attribute(user, &self.config.meta_key).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(user = %user, "maestro key vanished before it could be deleted");
                return Err(RevokeError::RevokeFailed.into());
            }
            Err(e) => {
                warn!(user = %user, "maestro key delete failed: {}", e);
                return Err(RevokeError::RevokeFailed.into());
            }
        }

        let demotion = self.demote(user).await;
        match &demotion {
            Demotion::Demoted(role) => info!(user = %user, role = %role, "maestro access revoked"),
            Demotion::UserMissing => warn!(user = %user, "maestro key revoked but user is gone"),
            Demotion::Failed(reason) => {
                warn!(user = %user, "maestro key revoked but demotion failed: {}", reason)
            }
        }

        Ok(RevokeReport { demotion })
    }

    /// Resolve a key to the profile of the web professional who issued it.
    pub async fn resolve_profile(&self, key: &GrantKey) -> Result<Profile> {
        Ok(self.resolver.resolve(key).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Requests
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve the current user of an inbound request once and return a
    /// scope whose operations default to that user.
    ///
    /// `session_user` is whatever the session layer reports; `None`, the
    /// anonymous id and ids unknown to the directory all yield an anonymous
    /// scope.
    pub async fn for_request(&self, session_user: Option<UserId>) -> Result<RequestScope<'_, S, R>> {
        let current = match session_user {
            Some(id) if !id.is_anonymous() => self.store.get_user(id).await?,
            _ => None,
        };
        Ok(RequestScope::new(self, RequestContext::new(current)))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    /// Read and classify the stored value, healing an empty entry.
    ///
    /// The anonymous user never holds a key and is not looked up.
    async fn read_state(&self, user: UserId) -> Result<GrantState> {
        if user.is_anonymous() {
            return Ok(GrantState::Ungranted);
        }

        let meta_key = &self.config.meta_key;
        let stored = self.store.get_attribute(user, meta_key).await?;
        let state = GrantState::classify(stored.as_deref());

        let transition = state.apply(Event::Read);
        if transition.effect == Effect::Heal && self.config.heal_empty_keys {
            let removed = self.store.delete_attribute(user, meta_key).await?;
            warn!(user = %user, removed, "deleted empty maestro key");
            return Ok(transition.next);
        }

        Ok(state)
    }

    async fn user_exists(&self, user: UserId) -> Result<bool> {
        if user.is_anonymous() {
            return Ok(false);
        }
        Ok(self.store.get_user(user).await?.is_some())
    }

    async fn demote(&self, user: UserId) -> Demotion {
        let role = &self.config.demotion_role;
        match self.store.set_role(user, role).await {
            Ok(true) => Demotion::Demoted(role.clone()),
            Ok(false) => Demotion::UserMissing,
            Err(e) => Demotion::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maestro_core::{Role, User};
    use maestro_grants::MemoryProfileResolver;
    use maestro_store::MemoryStore;

    fn key(s: &str) -> GrantKey {
        GrantKey::new(s).unwrap()
    }

    fn manager_with_user(id: u64) -> Maestro<MemoryStore> {
        let store = MemoryStore::new();
        store
            .insert_user_with_id(User::new(UserId(id), "webpro", Role::administrator()))
            .unwrap();
        Maestro::with_store(store)
    }

    #[tokio::test]
    async fn test_grant_then_read() {
        let maestro = manager_with_user(42);
        let user = UserId(42);

        let outcome = maestro.grant(user, &key("ABC123")).await.unwrap();
        assert!(outcome.meta_id().is_some());
        assert_eq!(maestro.get_key(user).await.unwrap(), Some(key("ABC123")));
        assert!(maestro.is_granted(user).await.unwrap());
    }

    #[tokio::test]
    async fn test_grant_does_not_overwrite() {
        let maestro = manager_with_user(42);
        let user = UserId(42);

        maestro.grant(user, &key("K1")).await.unwrap();
        let second = maestro.grant(user, &key("K2")).await.unwrap();

        assert_eq!(second, GrantOutcome::AlreadyGranted);
        assert_eq!(maestro.get_key(user).await.unwrap(), Some(key("K1")));
    }

    #[tokio::test]
    async fn test_anonymous_user_never_holds_a_key() {
        let maestro = manager_with_user(42);
        let anon = UserId::ANONYMOUS;

        assert_eq!(
            maestro.grant(anon, &key("K")).await.unwrap(),
            GrantOutcome::Refused
        );
        let update = maestro.update_key(anon, &key("K")).await.unwrap();
        assert_eq!(update, KeyUpdate::Refused);
        assert!(!update.is_success());
        assert_eq!(maestro.store().attribute_rows(anon, "bh_maestro_key").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_anonymous_reads_skip_the_store() {
        let maestro = manager_with_user(42);
        let anon = UserId::ANONYMOUS;
        maestro
            .store()
            .add_attribute(anon, "bh_maestro_key", "LEFTOVER", true)
            .await
            .unwrap();

        assert_eq!(maestro.get_key(anon).await.unwrap(), None);
        assert!(!maestro.delete_key(anon).await.unwrap());
        assert_eq!(maestro.store().attribute_rows(anon, "bh_maestro_key").unwrap(), 1);

        let scope = maestro.for_request(None).await.unwrap();
        assert_eq!(scope.get_key(None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_unchanged() {
        let maestro = manager_with_user(42);
        let user = UserId(42);

        maestro.grant(user, &key("SAME")).await.unwrap();
        let update = maestro.update_key(user, &key("SAME")).await.unwrap();

        assert_eq!(update, KeyUpdate::Unchanged);
        assert!(update.is_success());
    }

    #[tokio::test]
    async fn test_empty_key_kept_when_healing_disabled() {
        let store = MemoryStore::new();
        store
            .add_attribute(UserId(7), "bh_maestro_key", "", true)
            .await
            .unwrap();
        let config = MaestroConfig {
            heal_empty_keys: false,
            ..MaestroConfig::default()
        };
        let maestro = Maestro::new(store, StaticProfileResolver::default(), config).unwrap();

        assert_eq!(maestro.get_key(UserId(7)).await.unwrap(), None);
        assert_eq!(
            maestro.store().attribute_rows(UserId(7), "bh_maestro_key").unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_custom_demotion_role_and_meta_key() {
        let store = MemoryStore::new();
        store
            .insert_user_with_id(User::new(UserId(3), "webpro", Role::administrator()))
            .unwrap();
        let config = MaestroConfig {
            meta_key: "custom_key".into(),
            demotion_role: Role::new("contributor").unwrap(),
            heal_empty_keys: true,
        };
        let maestro = Maestro::new(store, StaticProfileResolver::default(), config).unwrap();

        maestro.grant(UserId(3), &key("K")).await.unwrap();
        assert_eq!(
            maestro.store().attribute_rows(UserId(3), "custom_key").unwrap(),
            1
        );

        let report = maestro.revoke(UserId(3)).await.unwrap();
        assert_eq!(
            report.demotion,
            Demotion::Demoted(Role::new("contributor").unwrap())
        );
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = MaestroConfig {
            meta_key: String::new(),
            ..MaestroConfig::default()
        };
        let result = Maestro::new(MemoryStore::new(), StaticProfileResolver::default(), config);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_resolve_profile_uses_resolver() {
        let resolver: MemoryProfileResolver = [Profile::new(
            key("ABC123"),
            "Ada Lovelace",
            "ada@example.test",
            "London, UK",
        )]
        .into_iter()
        .collect();
        let maestro =
            Maestro::new(MemoryStore::new(), resolver, MaestroConfig::default()).unwrap();

        let profile = maestro.resolve_profile(&key("ABC123")).await.unwrap();
        assert_eq!(profile.name, "Ada Lovelace");

        let err = maestro.resolve_profile(&key("OTHER")).await.unwrap_err();
        assert!(matches!(
            err,
            crate::MaestroError::Resolve(maestro_grants::ResolveError::UnknownKey)
        ));
    }
}
