//! Identity keypairs.
//!
//! Callers are identified by the 32-byte form of an Ed25519 verifying key.
//! The ledger itself never verifies signatures; it only needs stable,
//! collision-resistant identities, which the key bytes provide.

use ed25519_dalek::SigningKey;
use std::fmt;

use crate::types::UserId;

/// An identity keypair.
///
/// Wraps ed25519-dalek's SigningKey. The derived [`UserId`] is the
/// verifying-key bytes.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the identity derived from this keypair.
    pub fn user_id(&self) -> UserId {
        UserId(self.signing_key.verifying_key().to_bytes())
    }

    /// Get the raw seed bytes (secret key material).
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.user_id())
    }
}
