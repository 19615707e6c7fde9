//! Proptest generators for property-based testing.

use proptest::prelude::*;

use veil_ledger_core::{Fee, Keypair, OracleRef, RequestId, UserId};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random user identity (never null).
pub fn user_id() -> impl Strategy<Value = UserId> {
    keypair().prop_map(|kp| kp.user_id())
}

/// Generate a random request id.
pub fn request_id() -> impl Strategy<Value = RequestId> {
    any::<u64>().prop_map(RequestId)
}

/// Generate a fee within a plausible range.
pub fn fee() -> impl Strategy<Value = Fee> {
    (0u128..=1_000_000u128).prop_map(Fee)
}

/// Generate a non-zero oracle reference.
pub fn oracle_ref() -> impl Strategy<Value = OracleRef> {
    any::<[u8; 32]>()
        .prop_filter("zero reference is invalid", |b| b != &[0u8; 32])
        .prop_map(OracleRef::from_bytes)
}

/// Generate a request tag.
pub fn tag() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,31}".prop_map(String::from)
}

/// Generate a plaintext scalar.
pub fn scalar() -> impl Strategy<Value = u64> {
    any::<u64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_ledger_fhe::{ImportProof, MemoryFhe, SealKey, SealedScalar};

    proptest! {
        #[test]
        fn test_import_proof_deterministic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(ImportProof::compute(&bytes), ImportProof::compute(&bytes));
        }

        #[test]
        fn test_sealed_scalar_roundtrip(value in scalar(), key_bytes in any::<[u8; 32]>()) {
            let key = SealKey::from_bytes(key_bytes);
            let sealed = SealedScalar::seal(value, &key).unwrap();
            prop_assert_eq!(sealed.open(&key).unwrap(), value);
        }

        #[test]
        fn test_generated_user_ids_never_null(user in user_id()) {
            prop_assert!(!user.is_null());
        }

        #[test]
        fn test_xor_matches_plaintext(a in scalar(), b in scalar()) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            rt.block_on(async {
                use veil_ledger_fhe::FheBackend;

                let fhe = MemoryFhe::new();
                let ha = fhe.constant(a).await.unwrap();
                let hb = fhe.constant(b).await.unwrap();
                let mixed = fhe.xor(&ha, &hb).await.unwrap();

                let probe = UserId::from_bytes([1; 32]);
                fhe.grant_permanent(&mixed, &probe).await.unwrap();
                assert_eq!(fhe.decrypt_for(&mixed, &probe).unwrap(), a ^ b);
            });
        }
    }
}
