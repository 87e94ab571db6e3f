//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use maestro::{Maestro, MaestroConfig, MaestroError, StaticProfileResolver};
use maestro_core::{GrantKey, Role, User, UserId};
use maestro_store::{AddResult, AttributeStore, MemoryStore, UserDirectory};

use crate::generators::{Observed, Op, UpdateKind};

/// The site owner seeded into every fixture.
pub const OWNER: UserId = UserId(1);

/// The web professional seeded into every fixture.
pub const WEBPRO: UserId = UserId(42);

/// A memory-backed grant manager with an owner and a web professional,
/// both administrators.
pub struct TestFixture {
    pub maestro: Maestro<MemoryStore>,
}

impl TestFixture {
    /// Create a fixture with the default configuration.
    pub fn new() -> Self {
        Self::with_config(MaestroConfig::default())
    }

    /// Create a fixture with a custom configuration.
    ///
    /// Panics if the configuration is invalid.
    pub fn with_config(config: MaestroConfig) -> Self {
        let store = MemoryStore::new();
        seed(&store, OWNER, "owner");
        seed(&store, WEBPRO, "webpro");
        let maestro = Maestro::new(store, StaticProfileResolver::default(), config)
            .expect("fixture config must be valid");
        Self { maestro }
    }

    /// Add another administrator.
    pub fn add_user(&self, id: UserId, login: &str) {
        seed(self.maestro.store(), id, login);
    }

    /// Store an empty key for `user`, bypassing the manager.
    ///
    /// Returns `false` if the user already had a value.
    pub async fn plant_empty_key(&self, user: UserId) -> bool {
        let meta_key = &self.maestro.config().meta_key;
        let added = self
            .maestro
            .store()
            .add_attribute(user, meta_key, "", true)
            .await
            .expect("memory store add");
        matches!(added, AddResult::Added(_))
    }

    /// The number of stored key rows for `user`.
    pub fn key_rows(&self, user: UserId) -> usize {
        self.maestro
            .store()
            .attribute_rows(user, &self.maestro.config().meta_key)
            .expect("memory store read")
    }

    /// The current role of `user`.
    ///
    /// Panics if the user does not exist.
    pub async fn role_of(&self, user: UserId) -> Role {
        self.maestro
            .store()
            .get_user(user)
            .await
            .expect("memory store read")
            .expect("user must exist")
            .role
    }

    /// Run one operation against the manager and record what it did.
    pub async fn run(&self, user: UserId, op: &Op) -> Observed {
        let m = &self.maestro;
        match op {
            Op::Grant(key) => {
                let outcome = m.grant(user, key).await.expect("grant");
                Observed::Grant(outcome.meta_id().is_some())
            }
            Op::Update(key) => {
                let update = m.update_key(user, key).await.expect("update");
                Observed::Update(UpdateKind::from(&update))
            }
            Op::Revoke => match m.revoke(user).await {
                Ok(report) => {
                    assert!(report.demotion.is_demoted(), "{:?}", report.demotion);
                    Observed::Revoke(Ok(()))
                }
                Err(MaestroError::Revoke(e)) => Observed::Revoke(Err(e)),
                Err(e) => panic!("revoke failed: {}", e),
            },
            Op::Read => Observed::Key(m.get_key(user).await.expect("read")),
            Op::Check => Observed::Granted(m.is_granted(user).await.expect("check")),
            Op::Delete => Observed::Deleted(m.delete_key(user).await.expect("delete")),
            Op::PlantEmpty => Observed::Planted(self.plant_empty_key(user).await),
        }
    }

    /// Grant `key` to `user` and check it was stored.
    pub async fn grant(&self, user: UserId, key: &str) -> GrantKey {
        let key = GrantKey::new(key).expect("valid key");
        let outcome = self.maestro.grant(user, &key).await.expect("grant");
        assert!(outcome.meta_id().is_some(), "user already granted");
        key
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a fixture with `count` extra web professionals, numbered from 100.
pub fn site_with_webpros(count: u64) -> (TestFixture, Vec<UserId>) {
    let fixture = TestFixture::new();
    let users = (0..count)
        .map(|i| {
            let id = UserId(100 + i);
            fixture.add_user(id, &format!("webpro-{}", i));
            id
        })
        .collect();
    (fixture, users)
}

fn seed(store: &MemoryStore, id: UserId, login: &str) {
    store
        .insert_user_with_id(User::new(id, login, Role::administrator()))
        .expect("memory store insert");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_users() {
        let fixture = TestFixture::new();

        assert_eq!(fixture.role_of(OWNER).await, Role::administrator());
        assert_eq!(fixture.role_of(WEBPRO).await, Role::administrator());
        assert!(!fixture.maestro.is_granted(WEBPRO).await.unwrap());
    }

    #[tokio::test]
    async fn test_planted_key_is_healed() {
        let fixture = TestFixture::new();

        assert!(fixture.plant_empty_key(WEBPRO).await);
        assert_eq!(fixture.key_rows(WEBPRO), 1);

        assert_eq!(fixture.maestro.get_key(WEBPRO).await.unwrap(), None);
        assert_eq!(fixture.key_rows(WEBPRO), 0);
    }

    #[tokio::test]
    async fn test_site_with_webpros() {
        let (fixture, users) = site_with_webpros(3);
        assert_eq!(users, vec![UserId(100), UserId(101), UserId(102)]);

        fixture.grant(users[1], "MID").await;

        assert!(!fixture.maestro.is_granted(users[0]).await.unwrap());
        assert!(fixture.maestro.is_granted(users[1]).await.unwrap());
        assert!(!fixture.maestro.is_granted(users[2]).await.unwrap());
    }
}
