//! # Maestro Store
//!
//! Storage abstraction for Maestro access grants. Provides trait-based
//! interfaces for per-user attributes and the user directory, with SQLite
//! and in-memory implementations.
//!
//! ## Overview
//!
//! The grant manager never talks to a database directly. It reads and
//! writes the grant key through [`AttributeStore`] and checks users and
//! roles through [`UserDirectory`]. [`SqliteStore`] is the persistent
//! backend, [`MemoryStore`] the one used in tests. Both implement both
//! traits.
//!
//! ## Key Types
//!
//! - [`AttributeStore`] - Get/add/update/delete a named attribute per user
//! - [`UserDirectory`] - User lookup, roles, provisioning
//! - [`AddResult`] - Outcome of an add (stored, or refused as duplicate)
//! - [`UpdateResult`] - Outcome of a compare-and-swap update
//!
//! ## Usage
//!
//! ```rust,no_run
//! use maestro_core::{Role, MAESTRO_KEY_ATTRIBUTE};
//! use maestro_store::{AttributeStore, SqliteStore, UserDirectory};
//!
//! async fn example() -> maestro_store::Result<()> {
//!     let store = SqliteStore::open("maestro.db")?;
//!
//!     let user = store.insert_user("webpro", &Role::administrator()).await?;
//!     store
//!         .add_attribute(user, MAESTRO_KEY_ATTRIBUTE, "ABC123", true)
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Absence is not failure**: lookups return `Option`, writes return an
//!   outcome enum; [`StoreError`] is reserved for backend failures.
//! - **Atomic unique add**: check and insert happen in one step.
//! - **CAS updates**: an update may name the value it expects to replace.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{AddResult, AttributeStore, UpdateResult, UserDirectory};
