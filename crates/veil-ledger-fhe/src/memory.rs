//! In-memory implementation of the FheBackend trait.
//!
//! This is primarily for testing. Plaintext scalars are sealed under a
//! backend-held ChaCha20-Poly1305 key and addressed by content-derived
//! Blake3 handles, so nothing outside the backend can read a value without
//! a grant. It is not homomorphic encryption; it has the same observable
//! contract.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use veil_ledger_core::{CiphertextHandle, UserId};

use crate::crypto::{SealKey, SealedScalar};
use crate::error::{FheError, Result};
use crate::proof::ImportProof;
use crate::traits::FheBackend;

/// In-memory encryption backend.
///
/// All state is lost when the backend is dropped. Thread-safe via RwLock.
pub struct MemoryFhe {
    key: SealKey,
    inner: RwLock<MemoryFheInner>,
}

#[derive(Default)]
struct MemoryFheInner {
    /// Ciphertext records indexed by handle.
    records: HashMap<CiphertextHandle, CipherRecord>,
}

struct CipherRecord {
    sealed: SealedScalar,

    /// Users with permanent decrypt capability.
    permanent: HashSet<UserId>,

    /// Users with a grant scoped to the current operation.
    transient: HashSet<UserId>,

    /// Whether the owning ledger kept its own access.
    self_access: bool,
}

impl MemoryFhe {
    /// Create a new backend with a random sealing key.
    pub fn new() -> Self {
        Self {
            key: SealKey::generate(),
            inner: RwLock::new(MemoryFheInner::default()),
        }
    }

    /// Create with a deterministic sealing key (for reproducible tests).
    pub fn with_key(key: SealKey) -> Self {
        Self {
            key,
            inner: RwLock::new(MemoryFheInner::default()),
        }
    }

    /// Produce an external ciphertext and matching proof for `value`.
    ///
    /// Stands in for client-side encryption against the platform key; the
    /// result is what callers feed to `import_external`.
    pub fn seal_external(&self, value: u64) -> Result<(Bytes, ImportProof)> {
        let sealed = SealedScalar::seal(value, &self.key)?;
        let bytes = Bytes::from(sealed.to_bytes());
        let proof = ImportProof::compute(&bytes);
        Ok((bytes, proof))
    }

    /// Decrypt a handle on behalf of `user`.
    ///
    /// Fails with `AccessDenied` unless the user holds a permanent or
    /// still-live transient grant.
    pub fn decrypt_for(&self, handle: &CiphertextHandle, user: &UserId) -> Result<u64> {
        let inner = self.inner.read().unwrap();
        let record = inner
            .records
            .get(handle)
            .ok_or(FheError::UnknownHandle(*handle))?;

        if !record.permanent.contains(user) && !record.transient.contains(user) {
            return Err(FheError::AccessDenied(*user));
        }

        record.sealed.open(&self.key)
    }

    /// Whether `user` holds a permanent grant on `handle`.
    pub fn has_permanent_access(&self, handle: &CiphertextHandle, user: &UserId) -> bool {
        let inner = self.inner.read().unwrap();
        inner
            .records
            .get(handle)
            .map(|r| r.permanent.contains(user))
            .unwrap_or(false)
    }

    /// Whether `user` holds a transient grant on `handle` right now.
    pub fn has_transient_access(&self, handle: &CiphertextHandle, user: &UserId) -> bool {
        let inner = self.inner.read().unwrap();
        inner
            .records
            .get(handle)
            .map(|r| r.transient.contains(user))
            .unwrap_or(false)
    }

    /// Whether the owning ledger kept access on `handle`.
    pub fn has_self_access(&self, handle: &CiphertextHandle) -> bool {
        let inner = self.inner.read().unwrap();
        inner
            .records
            .get(handle)
            .map(|r| r.self_access)
            .unwrap_or(false)
    }

    /// Drop every transient grant.
    ///
    /// The platform expires transient grants at the end of each operation;
    /// tests call this to mark that boundary.
    pub fn end_transient_scope(&self) {
        let mut inner = self.inner.write().unwrap();
        for record in inner.records.values_mut() {
            record.transient.clear();
        }
    }

    /// Number of ciphertexts the backend currently owns.
    pub fn handle_count(&self) -> usize {
        self.inner.read().unwrap().records.len()
    }

    fn derive_handle(sealed_bytes: &[u8]) -> CiphertextHandle {
        let mut hasher = blake3::Hasher::new_derive_key("veil-ledger-v0-handle");
        hasher.update(sealed_bytes);
        CiphertextHandle(*hasher.finalize().as_bytes())
    }

    fn insert_sealed(&self, sealed: SealedScalar) -> CiphertextHandle {
        let handle = Self::derive_handle(&sealed.to_bytes());
        let mut inner = self.inner.write().unwrap();
        inner.records.entry(handle).or_insert(CipherRecord {
            sealed,
            permanent: HashSet::new(),
            transient: HashSet::new(),
            self_access: false,
        });
        handle
    }

    fn open_scalar(&self, handle: &CiphertextHandle) -> Result<u64> {
        let inner = self.inner.read().unwrap();
        let record = inner
            .records
            .get(handle)
            .ok_or(FheError::UnknownHandle(*handle))?;
        record.sealed.open(&self.key)
    }
}

impl Default for MemoryFhe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FheBackend for MemoryFhe {
    async fn import_external(
        &self,
        sealed: &Bytes,
        proof: &ImportProof,
    ) -> Result<CiphertextHandle> {
        if !proof.matches(sealed) {
            return Err(FheError::InvalidProof);
        }

        let parsed = SealedScalar::from_bytes(sealed)?;
        // Must open under our key: a foreign ciphertext with a self-made
        // proof is still rejected.
        parsed.open(&self.key)?;

        Ok(self.insert_sealed(parsed))
    }

    async fn grant_permanent(&self, handle: &CiphertextHandle, user: &UserId) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        let record = inner
            .records
            .get_mut(handle)
            .ok_or(FheError::UnknownHandle(*handle))?;
        record.permanent.insert(*user);
        Ok(())
    }

    async fn grant_transient(&self, handle: &CiphertextHandle, user: &UserId) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        let record = inner
            .records
            .get_mut(handle)
            .ok_or(FheError::UnknownHandle(*handle))?;
        record.transient.insert(*user);
        Ok(())
    }

    async fn grant_self(&self, handle: &CiphertextHandle) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        let record = inner
            .records
            .get_mut(handle)
            .ok_or(FheError::UnknownHandle(*handle))?;
        record.self_access = true;
        Ok(())
    }

    async fn add(&self, handle: &CiphertextHandle, constant: u64) -> Result<CiphertextHandle> {
        let value = self.open_scalar(handle)?;
        let sealed = SealedScalar::seal(value.wrapping_add(constant), &self.key)?;
        Ok(self.insert_sealed(sealed))
    }

    async fn xor(&self, a: &CiphertextHandle, b: &CiphertextHandle) -> Result<CiphertextHandle> {
        let lhs = self.open_scalar(a)?;
        let rhs = self.open_scalar(b)?;
        let sealed = SealedScalar::seal(lhs ^ rhs, &self.key)?;
        Ok(self.insert_sealed(sealed))
    }

    async fn constant(&self, value: u64) -> Result<CiphertextHandle> {
        let sealed = SealedScalar::seal(value, &self.key)?;
        Ok(self.insert_sealed(sealed))
    }
}
