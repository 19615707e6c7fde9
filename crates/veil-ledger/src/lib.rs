//! # veil-ledger
//!
//! A permission ledger over a single encrypted value: permanent decrypt
//! grants, transient (one-operation) grants, and entropy-augmented grants
//! that mix oracle randomness into the stored value before granting access.
//!
//! ## Overview
//!
//! One `Ledger` instance owns:
//!
//! - **StoredValue**: an opaque ciphertext handle, set once at
//!   initialization, never replaced
//! - **Permissions**: which users hold permanent decrypt rights
//! - **Entropy requests**: single-use tickets for oracle randomness
//!
//! The cryptography lives behind two injected seams: an encryption backend
//! ([`veil_ledger_fhe::FheBackend`]) and an entropy oracle
//! ([`veil_ledger_oracle::EntropyOracle`]). The ledger is pure permission
//! bookkeeping plus an ordered event log.
//!
//! ## Key Concepts
//!
//! - **Permanent grant**: survives until revoked (no revoke operation
//!   exists today) or forever.
//! - **Transient grant**: valid for one operation only, never persisted.
//! - **Entropy-augmented grant**: access to `stored ^ entropy`, a fresh
//!   derived value, rather than to the base.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use veil_ledger::{Ledger, core::{Fee, Keypair, OracleRef}};
//! use veil_ledger::fhe::MemoryFhe;
//! use veil_ledger::oracle::MemoryOracle;
//!
//! async fn example() {
//!     let fhe = Arc::new(MemoryFhe::new());
//!     let oracle = Arc::new(MemoryOracle::new(Arc::clone(&fhe), Fee(10)));
//!
//!     let mut ledger = Ledger::new(
//!         OracleRef::from_bytes([0x0a; 32]),
//!         Arc::clone(&fhe),
//!         Arc::clone(&oracle),
//!     )
//!     .unwrap();
//!
//!     let owner = Keypair::generate().user_id();
//!     let (sealed, proof) = fhe.seal_external(42).unwrap();
//!     ledger.initialize(owner, &sealed, &proof).await.unwrap();
//!
//!     let reader = Keypair::generate().user_id();
//!     ledger.allow(reader).await.unwrap();
//!     assert!(ledger.is_allowed(&reader));
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `veil_ledger::core` - Core primitives (UserId, events, etc.)
//! - `veil_ledger::fhe` - Encryption backend seam
//! - `veil_ledger::oracle` - Entropy oracle seam

pub mod error;
pub mod ledger;

pub use error::{LedgerError, Result};
pub use ledger::{EntropyRequest, Ledger};

pub use veil_ledger_core as core;
pub use veil_ledger_fhe as fhe;
pub use veil_ledger_oracle as oracle;
