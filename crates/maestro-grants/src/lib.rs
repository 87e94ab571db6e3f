//! # Maestro Grants
//!
//! Grant key state, operation outcomes and profile resolution.
//!
//! ## Overview
//!
//! A user either holds a grant key or does not. This crate holds the pure
//! part of that model: classifying a stored value ([`GrantState`]),
//! planning what each event must do ([`Transition`]), and the typed
//! outcomes the grant manager reports. It does no storage I/O.
//!
//! ## State Machine
//!
//! | State | Event | Effect | Next |
//! |---|---|---|---|
//! | Ungranted | grant | store key | Granted |
//! | Granted | grant | none | Granted |
//! | Granted | update | compare-and-swap replace | Granted |
//! | Ungranted | update | store key | Granted |
//! | Granted | revoke | delete key, demote user | Ungranted |
//! | Ungranted | revoke | reject with `NotGranted` | Ungranted |
//! | Corrupt (empty value) | read | delete entry | Ungranted |
//!
//! ## Profile Resolution
//!
//! [`ProfileResolver`] is the integration point for looking up the web
//! professional behind a key. [`StaticProfileResolver`] is a placeholder
//! that answers every key with fixed details; [`MemoryProfileResolver`]
//! serves a table of known keys.

pub mod error;
pub mod grant;
pub mod resolver;
pub mod state;

pub use error::{ResolveError, RevokeError};
pub use grant::{Demotion, GrantOutcome, KeyUpdate, RevokeReport};
pub use resolver::{MemoryProfileResolver, ProfileResolver, StaticProfileResolver};
pub use state::{Effect, Event, GrantState, RevokePlan, Transition, UpdatePlan};
