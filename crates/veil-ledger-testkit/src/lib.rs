//! # veil-ledger-testkit
//!
//! Testing utilities for veil-ledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a ledger wired to in-memory collaborators, with named
//!   identities and one-line initialization
//! - **Generators**: proptest strategies for identities, fees, tags, and
//!   scalars
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use veil_ledger_testkit::TestFixture;
//!
//! # async fn example() {
//! let mut fixture = TestFixture::new();
//! fixture.initialize_with(42).await;
//!
//! let reader = fixture.new_user();
//! fixture.ledger.allow(reader).await.unwrap();
//! # }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use veil_ledger_testkit::generators::user_id;
//!
//! proptest! {
//!     #[test]
//!     fn identities_are_not_null(user in user_id()) {
//!         prop_assert!(!user.is_null());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{TestFixture, FIXTURE_ORACLE_REF};
