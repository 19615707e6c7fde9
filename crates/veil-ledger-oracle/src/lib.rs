//! # veil-ledger-oracle
//!
//! The entropy-oracle seam for veil-ledger.
//!
//! ## Overview
//!
//! An entropy oracle is an external randomness provider reached through a
//! narrow request/fulfill interface: quote a fee, submit a paid request,
//! poll for fulfillment, fetch the encrypted entropy. The ledger layers its
//! own single-use bookkeeping on top; the oracle itself is free to fulfill
//! requests in any order and at any time.
//!
//! ## Key Concepts
//!
//! - **EntropyOracle**: the async trait every oracle implements
//! - **MemoryOracle**: in-memory oracle for tests with explicit,
//!   test-driven fulfillment

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{OracleError, Result};
pub use memory::MemoryOracle;
pub use traits::EntropyOracle;
