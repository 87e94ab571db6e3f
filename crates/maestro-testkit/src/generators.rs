//! Proptest generators for property-based testing.
//!
//! Besides value strategies this module holds [`KeyModel`], a reference
//! model of a single existing user's grant. Operation sequences generated
//! by [`ops`] can be replayed against both the model and a real manager
//! (see [`crate::fixtures::TestFixture::run`]) and the observations compared.

use proptest::prelude::*;

use maestro_core::{GrantKey, UserId};
use maestro_grants::{Effect, Event, GrantState, KeyUpdate, RevokeError, RevokePlan, UpdatePlan};

/// Generate a non-empty grant key.
pub fn grant_key() -> impl Strategy<Value = GrantKey> {
    "[A-Z0-9]{1,16}".prop_filter_map("non-empty key", |s| GrantKey::new(s).ok())
}

/// Generate a non-anonymous user id.
pub fn user_id() -> impl Strategy<Value = UserId> {
    (1u64..=10_000).prop_map(UserId)
}

/// An operation on one user's grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Grant(GrantKey),
    Update(GrantKey),
    Revoke,
    Read,
    Check,
    Delete,
    /// Write an empty value straight into the store, bypassing the manager.
    PlantEmpty,
}

/// Generate a single operation.
///
/// Keys are drawn from a small pool so updates regularly hit the stored key.
pub fn op() -> impl Strategy<Value = Op> {
    let key = prop::sample::select(vec!["ALPHA", "BRAVO", "CHARLIE"])
        .prop_filter_map("non-empty key", |s| GrantKey::new(s).ok());
    prop_oneof![
        3 => key.clone().prop_map(Op::Grant),
        3 => key.prop_map(Op::Update),
        2 => Just(Op::Revoke),
        2 => Just(Op::Read),
        1 => Just(Op::Check),
        1 => Just(Op::Delete),
        1 => Just(Op::PlantEmpty),
    ]
}

/// Generate a sequence of up to `max_len` operations.
pub fn ops(max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op(), 0..=max_len)
}

/// Outcome of a key update, without the row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Created,
    Replaced,
    Unchanged,
    Conflict,
    Refused,
}

impl From<&KeyUpdate> for UpdateKind {
    fn from(update: &KeyUpdate) -> Self {
        match update {
            KeyUpdate::Created(_) => UpdateKind::Created,
            KeyUpdate::Replaced => UpdateKind::Replaced,
            KeyUpdate::Unchanged => UpdateKind::Unchanged,
            KeyUpdate::Conflict => UpdateKind::Conflict,
            KeyUpdate::Refused => UpdateKind::Refused,
        }
    }
}

/// What an operation was observed to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    /// `true` when a key was stored.
    Grant(bool),
    Update(UpdateKind),
    /// `Ok(())` when the grant was revoked and the user demoted.
    Revoke(Result<(), RevokeError>),
    Key(Option<GrantKey>),
    Granted(bool),
    Deleted(bool),
    /// `true` when the empty value was written.
    Planted(bool),
}

/// Reference model of one existing user's grant, with healing reads.
///
/// Transitions come from the grant state table; the model adds what the
/// manager does around it: reads heal before updates and revokes, and
/// grants never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyModel {
    state: GrantState,
    demoted: bool,
}

impl KeyModel {
    /// A user with no stored key.
    pub fn new() -> Self {
        Self {
            state: GrantState::Ungranted,
            demoted: false,
        }
    }

    /// The key the user currently holds.
    pub fn key(&self) -> Option<&GrantKey> {
        self.state.key()
    }

    /// Whether a revoke has demoted the user.
    pub fn demoted(&self) -> bool {
        self.demoted
    }

    /// Apply an operation and return what the manager should report.
    pub fn apply(&mut self, op: &Op) -> Observed {
        match op {
            Op::Grant(key) => {
                let t = self.state.apply(Event::Grant(key.clone()));
                let stored = matches!(t.effect, Effect::Store(_));
                self.state = t.next;
                Observed::Grant(stored)
            }
            Op::Update(key) => {
                self.read();
                let kind = match self.state.plan_update(key.clone()) {
                    UpdatePlan::Store(_) => UpdateKind::Created,
                    UpdatePlan::Replace { previous, next } if previous == next => {
                        UpdateKind::Unchanged
                    }
                    UpdatePlan::Replace { .. } => UpdateKind::Replaced,
                };
                self.state = GrantState::Granted(key.clone());
                Observed::Update(kind)
            }
            Op::Revoke => {
                self.read();
                match self.state.plan_revoke() {
                    RevokePlan::Remove => {
                        self.state = GrantState::Ungranted;
                        self.demoted = true;
                        Observed::Revoke(Ok(()))
                    }
                    RevokePlan::Reject(e) => Observed::Revoke(Err(e)),
                }
            }
            Op::Read => {
                self.read();
                Observed::Key(self.state.key().cloned())
            }
            Op::Check => {
                self.read();
                Observed::Granted(self.state.is_granted())
            }
            Op::Delete => {
                let existed = self.state != GrantState::Ungranted;
                self.state = GrantState::Ungranted;
                Observed::Deleted(existed)
            }
            Op::PlantEmpty => {
                let free = self.state == GrantState::Ungranted;
                if free {
                    self.state = GrantState::Corrupt;
                }
                Observed::Planted(free)
            }
        }
    }

    fn read(&mut self) {
        self.state = self.state.apply(Event::Read).next;
    }
}

impl Default for KeyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{TestFixture, WEBPRO};
    use maestro_core::Role;

    fn key(s: &str) -> GrantKey {
        GrantKey::new(s).unwrap()
    }

    #[test]
    fn test_model_lifecycle() {
        let mut model = KeyModel::new();

        assert_eq!(model.apply(&Op::Grant(key("A"))), Observed::Grant(true));
        assert_eq!(model.apply(&Op::Grant(key("B"))), Observed::Grant(false));
        assert_eq!(
            model.apply(&Op::Update(key("B"))),
            Observed::Update(UpdateKind::Replaced)
        );
        assert_eq!(model.apply(&Op::Revoke), Observed::Revoke(Ok(())));
        assert!(model.demoted());
        assert_eq!(
            model.apply(&Op::Revoke),
            Observed::Revoke(Err(RevokeError::NotGranted))
        );
    }

    #[test]
    fn test_model_empty_value_blocks_grant_until_read() {
        let mut model = KeyModel::new();

        assert_eq!(model.apply(&Op::PlantEmpty), Observed::Planted(true));
        assert_eq!(model.apply(&Op::Grant(key("A"))), Observed::Grant(false));
        assert_eq!(model.apply(&Op::Read), Observed::Key(None));
        assert_eq!(model.apply(&Op::Grant(key("A"))), Observed::Grant(true));
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    proptest! {
        #[test]
        fn test_generated_keys_are_valid(k in grant_key()) {
            prop_assert!(!k.as_str().is_empty());
        }

        #[test]
        fn test_generated_users_are_not_anonymous(user in user_id()) {
            prop_assert!(!user.is_anonymous());
        }

        #[test]
        fn test_manager_matches_model(ops in ops(40)) {
            let rt = runtime();
            rt.block_on(async {
                let fixture = TestFixture::new();
                let mut model = KeyModel::new();

                for op in &ops {
                    let expected = model.apply(op);
                    let observed = fixture.run(WEBPRO, op).await;
                    prop_assert_eq!(&observed, &expected, "op {:?}", op);
                }

                let stored = fixture.maestro.get_key(WEBPRO).await.unwrap();
                prop_assert_eq!(stored.as_ref(), model.key());
                let demoted = fixture.role_of(WEBPRO).await == Role::subscriber();
                prop_assert_eq!(demoted, model.demoted());
                Ok(())
            })?;
        }
    }
}
