//! Symmetric sealing primitives for the in-memory backend.
//!
//! ChaCha20-Poly1305 authenticated encryption behind strong types. A real
//! confidential-computation backend replaces all of this; it exists so the
//! test backend keeps plaintexts genuinely opaque behind its handles.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{FheError, Result};

/// A 256-bit symmetric sealing key.
#[derive(Clone)]
pub struct SealKey([u8; 32]);

impl SealKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Seal a plaintext with this key.
    pub fn seal(&self, plaintext: &[u8], nonce: &SealNonce) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| FheError::SealError(e.to_string()))?;

        let nonce = Nonce::from_slice(&nonce.0);
        cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| FheError::SealError(e.to_string()))
    }

    /// Open a ciphertext with this key.
    pub fn open(&self, ciphertext: &[u8], nonce: &SealNonce) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| FheError::OpenError(e.to_string()))?;

        let nonce = Nonce::from_slice(&nonce.0);
        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| FheError::OpenError(e.to_string()))
    }
}

/// A 96-bit nonce for ChaCha20-Poly1305.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealNonce(pub [u8; 12]);

impl SealNonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; 12];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

/// A sealed scalar: nonce plus ciphertext, CBOR-encodable.
///
/// This is the byte form the backend hands out as "external ciphertext"
/// and accepts back through `import_external`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedScalar {
    /// Nonce used for sealing (unique per seal).
    pub nonce: SealNonce,

    /// The sealed data (includes authentication tag).
    pub ciphertext: Vec<u8>,
}

impl SealedScalar {
    /// Seal a u64 scalar under the given key.
    pub fn seal(value: u64, key: &SealKey) -> Result<Self> {
        let nonce = SealNonce::generate();
        let ciphertext = key.seal(&value.to_le_bytes(), &nonce)?;
        Ok(Self { nonce, ciphertext })
    }

    /// Open back to the scalar under the given key.
    pub fn open(&self, key: &SealKey) -> Result<u64> {
        let plain = key.open(&self.ciphertext, &self.nonce)?;
        let arr: [u8; 8] = plain
            .as_slice()
            .try_into()
            .map_err(|_| FheError::MalformedCiphertext("scalar is not 8 bytes".into()))?;
        Ok(u64::from_le_bytes(arr))
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).expect("CBOR serialization failed");
        buf
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| FheError::MalformedCiphertext(e.to_string()))
    }
}
