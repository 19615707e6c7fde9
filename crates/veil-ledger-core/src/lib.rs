//! # veil-ledger-core
//!
//! Core primitives for the veil-ledger: strongly typed identifiers,
//! identity keypairs, and the observable event log.
//!
//! ## Key Concepts
//!
//! - **UserId**: a 32-byte identity derived from an Ed25519 verifying key.
//!   The all-zero value is the null identity.
//! - **CiphertextHandle**: an opaque, content-derived reference to a
//!   ciphertext owned by the encryption backend.
//! - **RequestId / Fee / OracleRef**: oracle collaboration types.
//! - **EventLog**: ordered, append-only record of ledger state transitions,
//!   consumed by external watchers.
//!
//! This crate has no ledger logic of its own; it exists so the backend,
//! oracle, and ledger crates agree on one vocabulary.

pub mod crypto;
pub mod error;
pub mod events;
pub mod types;

pub use crypto::Keypair;
pub use error::{CoreError, Result};
pub use events::{EventLog, EventRecord, LedgerEvent};
pub use types::{CiphertextHandle, Fee, OracleRef, RequestId, UserId};
