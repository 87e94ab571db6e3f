//! Grant state computation.
//!
//! The per-user grant state is derived from the raw stored attribute value.
//! This module classifies stored values and plans the effect of each event;
//! performing the effect against a store is the caller's job.

use maestro_core::GrantKey;

use crate::error::RevokeError;

/// State of a single user's grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantState {
    /// No key is stored.
    Ungranted,

    /// A key is stored but its value is empty.
    ///
    /// Reads heal this by deleting the entry; it then behaves as
    /// [`GrantState::Ungranted`].
    Corrupt,

    /// A non-empty key is stored.
    Granted(GrantKey),
}

/// Something that can happen to a user's grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Store a key unless one exists.
    Grant(GrantKey),
    /// Store a key, replacing any existing one.
    Update(GrantKey),
    /// Delete the key and demote the user.
    Revoke,
    /// Read the key.
    Read,
}

/// The side effect an event requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Nothing to do.
    Noop,
    /// Add the key with add-only semantics.
    Store(GrantKey),
    /// Overwrite `previous` with `next` (compare-and-swap on `previous`).
    Replace { previous: GrantKey, next: GrantKey },
    /// Delete an empty stored value.
    Heal,
    /// Delete the key and demote the user.
    Remove,
    /// The event is not allowed in this state.
    Reject(RevokeError),
}

/// How an update must be carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdatePlan {
    /// No key is stored; add one with add-only semantics.
    Store(GrantKey),
    /// Overwrite `previous` with `next` (compare-and-swap on `previous`).
    Replace { previous: GrantKey, next: GrantKey },
}

/// How a revoke must be carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevokePlan {
    /// Delete the key and demote the user.
    Remove,
    /// The user holds no grant.
    Reject(RevokeError),
}

impl From<UpdatePlan> for Effect {
    fn from(plan: UpdatePlan) -> Self {
        match plan {
            UpdatePlan::Store(key) => Effect::Store(key),
            UpdatePlan::Replace { previous, next } => Effect::Replace { previous, next },
        }
    }
}

impl From<RevokePlan> for Effect {
    fn from(plan: RevokePlan) -> Self {
        match plan {
            RevokePlan::Remove => Effect::Remove,
            RevokePlan::Reject(e) => Effect::Reject(e),
        }
    }
}

/// The planned effect of an event and the state it leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// What must be done.
    pub effect: Effect,
    /// The state once the effect has been applied successfully.
    pub next: GrantState,
}

impl GrantState {
    /// Classify a raw stored value.
    pub fn classify(stored: Option<&str>) -> Self {
        match stored {
            None => GrantState::Ungranted,
            Some(value) => match GrantKey::from_stored(value) {
                Some(key) => GrantState::Granted(key),
                None => GrantState::Corrupt,
            },
        }
    }

    /// Whether the user holds a usable grant.
    pub fn is_granted(&self) -> bool {
        matches!(self, GrantState::Granted(_))
    }

    /// The stored key, if granted.
    pub fn key(&self) -> Option<&GrantKey> {
        match self {
            GrantState::Granted(key) => Some(key),
            _ => None,
        }
    }

    /// Consume the state and return the key, if granted.
    pub fn into_key(self) -> Option<GrantKey> {
        match self {
            GrantState::Granted(key) => Some(key),
            _ => None,
        }
    }

    /// Plan an update to `key`.
    ///
    /// A [`GrantState::Corrupt`] entry plans a plain store: callers read
    /// (and thereby heal) before updating.
    pub fn plan_update(&self, key: GrantKey) -> UpdatePlan {
        match self {
            GrantState::Granted(previous) => UpdatePlan::Replace {
                previous: previous.clone(),
                next: key,
            },
            GrantState::Ungranted | GrantState::Corrupt => UpdatePlan::Store(key),
        }
    }

    /// Plan a revoke.
    pub fn plan_revoke(&self) -> RevokePlan {
        match self {
            GrantState::Granted(_) => RevokePlan::Remove,
            GrantState::Ungranted | GrantState::Corrupt => {
                RevokePlan::Reject(RevokeError::NotGranted)
            }
        }
    }

    /// Plan the transition for an event.
    pub fn apply(&self, event: Event) -> Transition {
        match (self, event) {
            (GrantState::Ungranted, Event::Grant(key)) => Transition {
                next: GrantState::Granted(key.clone()),
                effect: Effect::Store(key),
            },
            // The leftover empty row still blocks an add-only store.
            (GrantState::Granted(_) | GrantState::Corrupt, Event::Grant(_)) => Transition {
                effect: Effect::Noop,
                next: self.clone(),
            },

            (_, Event::Update(key)) => Transition {
                next: GrantState::Granted(key.clone()),
                effect: self.plan_update(key).into(),
            },

            (_, Event::Revoke) => {
                let plan = self.plan_revoke();
                let next = match plan {
                    RevokePlan::Remove => GrantState::Ungranted,
                    RevokePlan::Reject(_) => self.clone(),
                };
                Transition {
                    effect: plan.into(),
                    next,
                }
            }

            (GrantState::Corrupt, Event::Read) => Transition {
                effect: Effect::Heal,
                next: GrantState::Ungranted,
            },
            (GrantState::Ungranted | GrantState::Granted(_), Event::Read) => Transition {
                effect: Effect::Noop,
                next: self.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn key(s: &str) -> GrantKey {
        GrantKey::new(s).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(GrantState::classify(None), GrantState::Ungranted);
        assert_eq!(GrantState::classify(Some("")), GrantState::Corrupt);
        assert_eq!(
            GrantState::classify(Some("ABC123")),
            GrantState::Granted(key("ABC123"))
        );
    }

    #[test]
    fn test_grant_from_ungranted_stores() {
        let t = GrantState::Ungranted.apply(Event::Grant(key("ABC123")));
        assert_eq!(t.effect, Effect::Store(key("ABC123")));
        assert!(t.next.is_granted());
    }

    #[test]
    fn test_grant_when_granted_is_noop() {
        let state = GrantState::Granted(key("K1"));
        let t = state.apply(Event::Grant(key("K2")));
        assert_eq!(t.effect, Effect::Noop);
        assert_eq!(t.next.key(), Some(&key("K1")));
    }

    #[test]
    fn test_update_replaces_with_previous_value() {
        let t = GrantState::Granted(key("ABC123")).apply(Event::Update(key("XYZ789")));
        assert_eq!(
            t.effect,
            Effect::Replace {
                previous: key("ABC123"),
                next: key("XYZ789"),
            }
        );
        assert_eq!(t.next.into_key(), Some(key("XYZ789")));
    }

    #[test]
    fn test_update_from_ungranted_stores() {
        let t = GrantState::Ungranted.apply(Event::Update(key("K")));
        assert_eq!(t.effect, Effect::Store(key("K")));
    }

    #[test]
    fn test_revoke() {
        let t = GrantState::Granted(key("K")).apply(Event::Revoke);
        assert_eq!(t.effect, Effect::Remove);
        assert_eq!(t.next, GrantState::Ungranted);

        let t = GrantState::Ungranted.apply(Event::Revoke);
        assert_eq!(t.effect, Effect::Reject(RevokeError::NotGranted));
        assert_eq!(t.next, GrantState::Ungranted);
    }

    #[test]
    fn test_plans_match_state_table() {
        let granted = GrantState::Granted(key("K"));

        assert_eq!(
            granted.plan_update(key("K2")),
            UpdatePlan::Replace {
                previous: key("K"),
                next: key("K2"),
            }
        );
        assert_eq!(
            GrantState::Corrupt.plan_update(key("K2")),
            UpdatePlan::Store(key("K2"))
        );
        assert_eq!(granted.plan_revoke(), RevokePlan::Remove);
        assert_eq!(
            GrantState::Corrupt.plan_revoke(),
            RevokePlan::Reject(RevokeError::NotGranted)
        );
    }

    #[test]
    fn test_read_heals_corrupt() {
        let t = GrantState::Corrupt.apply(Event::Read);
        assert_eq!(t.effect, Effect::Heal);
        assert_eq!(t.next, GrantState::Ungranted);
    }

    fn event() -> impl Strategy<Value = Event> {
        let k = "[A-Z0-9]{1,12}".prop_map(|s| GrantKey::new(s).unwrap());
        prop_oneof![
            k.clone().prop_map(Event::Grant),
            k.prop_map(Event::Update),
            Just(Event::Revoke),
            Just(Event::Read),
        ]
    }

    proptest! {
        #[test]
        fn test_corrupt_is_never_reentered(events in prop::collection::vec(event(), 0..32)) {
            let mut state = GrantState::Corrupt;
            let mut left = false;
            for event in events {
                let t = state.apply(event);
                if let Effect::Reject(_) = t.effect {
                    prop_assert_eq!(&t.next, &state);
                }
                state = t.next;
                if state != GrantState::Corrupt {
                    left = true;
                }
                if left {
                    prop_assert_ne!(&state, &GrantState::Corrupt);
                }
            }
        }

        #[test]
        fn test_granted_stays_granted_except_on_revoke(events in prop::collection::vec(event(), 1..32)) {
            let mut state = GrantState::Granted(GrantKey::new("SEED").unwrap());
            for event in events {
                let revoking = event == Event::Revoke;
                let was_granted = state.is_granted();
                state = state.apply(event).next;
                if was_granted && !revoking {
                    prop_assert!(state.is_granted());
                }
            }
        }
    }
}
