//! # Maestro Testkit
//!
//! Testing utilities for Maestro access grants.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a memory-backed grant manager with seeded users
//! - **Generators**: Proptest strategies for keys, users and operation sequences
//! - **Model**: a reference model of one user's grant to check the manager against
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use maestro_testkit::generators::{ops, KeyModel};
//!
//! proptest! {
//!     #[test]
//!     fn manager_matches_model(ops in ops(32)) {
//!         let mut model = KeyModel::new();
//!         for op in ops {
//!             let expected = model.apply(&op);
//!             // run `op` against a fixture and compare with `expected`
//!         }
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use maestro_testkit::fixtures::{TestFixture, WEBPRO};
//!
//! let fixture = TestFixture::new();
//! assert!(fixture.maestro.store().attribute_rows(WEBPRO, "bh_maestro_key").is_ok());
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{site_with_webpros, TestFixture, OWNER, WEBPRO};
pub use generators::{grant_key, op, ops, user_id, KeyModel, Observed, Op};
