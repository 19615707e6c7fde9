//! Import proofs.
//!
//! An external ciphertext enters the backend only together with a proof of
//! well-formedness. The test backend models the proof as a keyed Blake3
//! digest of the sealed bytes; a real backend substitutes its own ZK proof
//! verification behind the same type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte proof that a ciphertext is well formed.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProof(pub [u8; 32]);

impl ImportProof {
    /// Compute the proof for the given sealed bytes.
    pub fn compute(sealed_bytes: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new_derive_key("veil-ledger-v0-import-proof");
        hasher.update(sealed_bytes);
        Self(*hasher.finalize().as_bytes())
    }

    /// Check this proof against sealed bytes.
    pub fn matches(&self, sealed_bytes: &[u8]) -> bool {
        *self == Self::compute(sealed_bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for ImportProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImportProof({})", &hex_prefix(&self.0))
    }
}

fn hex_prefix(bytes: &[u8; 32]) -> String {
    bytes[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proof_is_deterministic() {
        let p1 = ImportProof::compute(b"sealed");
        let p2 = ImportProof::compute(b"sealed");
        assert_eq!(p1, p2);
    }

    #[test]
    fn test_proof_rejects_other_bytes() {
        let proof = ImportProof::compute(b"sealed");
        assert!(proof.matches(b"sealed"));
        assert!(!proof.matches(b"tampered"));
    }
}
