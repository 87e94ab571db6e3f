//! # Maestro
//!
//! Delegated administrator access for web professionals.
//!
//! ## Overview
//!
//! A site owner can hand a web professional (a "Maestro") access to their
//! site. The professional is represented by a site user holding an opaque
//! grant key issued by the hosting platform. This crate provides:
//!
//! - **Grants**: store, replace and read a user's grant key
//! - **Access checks**: whether a user currently holds a grant
//! - **Revocation**: delete the key and demote the user to a low-privilege role
//! - **Profiles**: resolve a key to the professional who issued it
//!
//! ## Key Concepts
//!
//! - **Grant key**: non-empty opaque string. At most one per user.
//! - **Empty key**: a stored empty value is treated as no key and deleted on read.
//! - **Explicit user**: every operation names its target user; the request
//!   adapter in [`context`] resolves the logged-in user once.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use maestro::{Maestro, GrantKey, UserId};
//! use maestro::store::SqliteStore;
//!
//! async fn example() -> maestro::Result<()> {
//!     let store = SqliteStore::open("maestro.db")?;
//!     let maestro = Maestro::with_store(store);
//!
//!     let user = UserId(42);
//!     let key = GrantKey::new("ABC123")?;
//!
//!     maestro.grant(user, &key).await?;
//!     assert!(maestro.is_granted(user).await?);
//!
//!     let report = maestro.revoke(user).await?;
//!     println!("demotion: {:?}", report.demotion);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `maestro::core` - Core types (GrantKey, UserId, Role, Profile)
//! - `maestro::store` - Attribute store, user directory and SQLite
//! - `maestro::grants` - Grant state, outcomes and profile resolvers

pub mod config;
pub mod context;
pub mod error;
pub mod manager;

// Re-export component crates
pub use maestro_core as core;
pub use maestro_grants as grants;
pub use maestro_store as store;

// Re-export main types for convenience
pub use config::MaestroConfig;
pub use context::{RequestContext, RequestScope};
pub use error::{MaestroError, Result};
pub use manager::Maestro;

// Re-export commonly used types
pub use maestro_core::{GrantKey, MetaId, Profile, Role, User, UserId};
pub use maestro_grants::{
    Demotion, GrantOutcome, KeyUpdate, ProfileResolver, RevokeError, RevokeReport,
    StaticProfileResolver,
};
