//! The FheBackend trait: abstract interface to the encryption subsystem.
//!
//! The ledger never manipulates ciphertext itself; every cryptographic
//! capability is delegated through this seam. Implementations include the
//! in-memory test backend and, in production, the platform's confidential
//! computation runtime.

use async_trait::async_trait;
use bytes::Bytes;

use veil_ledger_core::{CiphertextHandle, UserId};

use crate::error::Result;
use crate::proof::ImportProof;

/// Abstract encryption backend.
///
/// # Design Notes
///
/// - **Handles, not values**: the ledger holds `CiphertextHandle`s and never
///   sees plaintext. Arithmetic produces fresh handles; existing handles are
///   immutable.
/// - **Fail-fast**: every call either completes fully or returns an error
///   with no backend state change the ledger can observe.
/// - **Permission model**: permanent grants persist in the backend;
///   transient grants are scoped to the current operation and never persist.
#[async_trait]
pub trait FheBackend: Send + Sync {
    /// Import an externally produced ciphertext after verifying its proof.
    ///
    /// Returns the handle under which the backend now owns the value.
    /// Fails with `InvalidProof` if the proof does not match the bytes.
    async fn import_external(&self, sealed: &Bytes, proof: &ImportProof)
        -> Result<CiphertextHandle>;

    /// Grant `user` permanent decrypt capability on `handle`.
    async fn grant_permanent(&self, handle: &CiphertextHandle, user: &UserId) -> Result<()>;

    /// Grant `user` decrypt capability on `handle` for the current operation
    /// only. Not persisted.
    async fn grant_transient(&self, handle: &CiphertextHandle, user: &UserId) -> Result<()>;

    /// Keep the caller's (the ledger's) own access on `handle`.
    ///
    /// Required before a derived handle can be used in later operations.
    async fn grant_self(&self, handle: &CiphertextHandle) -> Result<()>;

    /// Homomorphic addition of a plaintext constant: returns a handle to
    /// `handle + constant`. The input handle is unchanged.
    async fn add(&self, handle: &CiphertextHandle, constant: u64) -> Result<CiphertextHandle>;

    /// Homomorphic XOR of two ciphertexts: returns a handle to `a ^ b`.
    /// Both input handles are unchanged.
    async fn xor(&self, a: &CiphertextHandle, b: &CiphertextHandle) -> Result<CiphertextHandle>;

    /// Encrypt a plaintext constant under the backend key.
    async fn constant(&self, value: u64) -> Result<CiphertextHandle>;
}
