//! # veil-ledger-fhe
//!
//! The encryption-subsystem seam for veil-ledger.
//!
//! ## Overview
//!
//! The ledger treats its confidential-computation backend as an injected
//! capability: an opaque store of ciphertexts addressed by handle, with
//! permission-gated decryption and a small homomorphic instruction set
//! (add-constant, xor, constant).
//!
//! ## Key Concepts
//!
//! - **FheBackend**: the async trait every backend implements
//! - **ImportProof**: proof of well-formedness accompanying external input
//! - **MemoryFhe**: in-memory backend for tests; seals scalars under
//!   ChaCha20-Poly1305 and enforces the grant model for real
//!
//! ## Usage
//!
//! ```rust,no_run
//! use veil_ledger_fhe::{FheBackend, MemoryFhe};
//! use veil_ledger_core::UserId;
//!
//! async fn example() {
//!     let fhe = MemoryFhe::new();
//!     let (bytes, proof) = fhe.seal_external(42).unwrap();
//!
//!     let handle = fhe.import_external(&bytes, &proof).await.unwrap();
//!     let user = UserId::from_bytes([1; 32]);
//!
//!     fhe.grant_permanent(&handle, &user).await.unwrap();
//!     assert_eq!(fhe.decrypt_for(&handle, &user).unwrap(), 42);
//! }
//! ```

pub mod crypto;
pub mod error;
pub mod memory;
pub mod proof;
pub mod traits;

pub use crypto::{SealKey, SealNonce, SealedScalar};
pub use error::{FheError, Result};
pub use memory::MemoryFhe;
pub use proof::ImportProof;
pub use traits::FheBackend;
