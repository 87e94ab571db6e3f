//! # Maestro Core
//!
//! Pure types for Maestro access grants: users, roles, grant keys and
//! web-professional profiles.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`UserId`] - Identifier of a site user (0 is the anonymous visitor)
//! - [`MetaId`] - Identifier of a stored user attribute row
//! - [`GrantKey`] - The secret key redeemed by a web professional
//! - [`Role`] - A site role name
//! - [`User`] - A user as reported by the user directory
//! - [`Profile`] - Web-professional details resolved from a key
//!
//! ## Attribute Name
//!
//! Grant keys live in the single-valued user attribute [`MAESTRO_KEY_ATTRIBUTE`].

pub mod error;
pub mod key;
pub mod profile;
pub mod types;
pub mod user;

pub use error::{CoreError, Result};
pub use key::GrantKey;
pub use profile::Profile;
pub use types::{MetaId, UserId};
pub use user::{Role, User};

/// Name of the user attribute that stores a grant key.
pub const MAESTRO_KEY_ATTRIBUTE: &str = "bh_maestro_key";
