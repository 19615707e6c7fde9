//! In-memory implementation of the EntropyOracle trait.
//!
//! This is primarily for testing. Requests start pending; the test drives
//! fulfillment explicitly with [`MemoryOracle::fulfill`] or
//! [`MemoryOracle::fulfill_with`], which mints the entropy ciphertext in a
//! shared backend so the ledger can mix it homomorphically.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use rand::Rng;

use veil_ledger_core::{CiphertextHandle, Fee, RequestId};
use veil_ledger_fhe::{FheBackend, MemoryFhe};

use crate::error::{OracleError, Result};
use crate::traits::EntropyOracle;

/// In-memory entropy oracle.
///
/// Shares a [`MemoryFhe`] with the system under test so fulfilled entropy
/// lands in the same ciphertext space as the ledger's stored value.
pub struct MemoryOracle {
    backend: Arc<MemoryFhe>,
    inner: RwLock<MemoryOracleInner>,
}

struct MemoryOracleInner {
    fee: Fee,
    next_id: u64,
    requests: HashMap<RequestId, OracleRequest>,
}

struct OracleRequest {
    tag: String,
    fee_paid: Fee,
    entropy: Option<CiphertextHandle>,
}

impl MemoryOracle {
    /// Create a new oracle quoting the given fee.
    pub fn new(backend: Arc<MemoryFhe>, fee: Fee) -> Self {
        Self {
            backend,
            inner: RwLock::new(MemoryOracleInner {
                fee,
                next_id: 1,
                requests: HashMap::new(),
            }),
        }
    }

    /// Change the quoted fee. Pending requests keep the fee they paid.
    pub fn set_fee(&self, fee: Fee) {
        self.inner.write().unwrap().fee = fee;
    }

    /// Fulfill a pending request with a random entropy value.
    pub async fn fulfill(&self, id: RequestId) -> Result<CiphertextHandle> {
        let value = rand::thread_rng().gen::<u64>();
        self.fulfill_with(id, value).await
    }

    /// Fulfill a pending request with a chosen entropy value
    /// (deterministic tests).
    pub async fn fulfill_with(&self, id: RequestId, value: u64) -> Result<CiphertextHandle> {
        {
            let inner = self.inner.read().unwrap();
            let request = inner
                .requests
                .get(&id)
                .ok_or(OracleError::UnknownRequest(id))?;
            if request.entropy.is_some() {
                return Err(OracleError::AlreadyFulfilled(id));
            }
        }

        // Mint the ciphertext outside the lock; the backend call is async.
        let handle = self.backend.constant(value).await?;

        let mut inner = self.inner.write().unwrap();
        let request = inner
            .requests
            .get_mut(&id)
            .ok_or(OracleError::UnknownRequest(id))?;
        request.entropy = Some(handle);
        Ok(handle)
    }

    /// The fee paid for a request, if known.
    pub fn fee_paid(&self, id: RequestId) -> Option<Fee> {
        self.inner
            .read()
            .unwrap()
            .requests
            .get(&id)
            .map(|r| r.fee_paid)
    }

    /// The tag a request was submitted with, if known.
    pub fn tag(&self, id: RequestId) -> Option<String> {
        self.inner
            .read()
            .unwrap()
            .requests
            .get(&id)
            .map(|r| r.tag.clone())
    }

    /// Number of requests ever issued.
    pub fn request_count(&self) -> usize {
        self.inner.read().unwrap().requests.len()
    }
}

#[async_trait]
impl EntropyOracle for MemoryOracle {
    async fn get_fee(&self) -> Result<Fee> {
        Ok(self.inner.read().unwrap().fee)
    }

    async fn request_entropy(&self, tag: &str, attached_fee: Fee) -> Result<RequestId> {
        let mut inner = self.inner.write().unwrap();
        if attached_fee < inner.fee {
            return Err(OracleError::FeeTooLow {
                quoted: inner.fee,
                attached: attached_fee,
            });
        }

        let id = RequestId(inner.next_id);
        inner.next_id += 1;
        inner.requests.insert(
            id,
            OracleRequest {
                tag: tag.to_string(),
                fee_paid: attached_fee,
                entropy: None,
            },
        );
        Ok(id)
    }

    async fn is_request_fulfilled(&self, id: RequestId) -> Result<bool> {
        let inner = self.inner.read().unwrap();
        let request = inner
            .requests
            .get(&id)
            .ok_or(OracleError::UnknownRequest(id))?;
        Ok(request.entropy.is_some())
    }

    async fn get_encrypted_entropy(&self, id: RequestId) -> Result<CiphertextHandle> {
        let inner = self.inner.read().unwrap();
        let request = inner
            .requests
            .get(&id)
            .ok_or(OracleError::UnknownRequest(id))?;
        request.entropy.ok_or(OracleError::NotFulfilled(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oracle_with_fee(fee: u128) -> (Arc<MemoryFhe>, MemoryOracle) {
        let backend = Arc::new(MemoryFhe::new());
        let oracle = MemoryOracle::new(Arc::clone(&backend), Fee(fee));
        (backend, oracle)
    }

    #[tokio::test]
    async fn test_request_lifecycle() {
        let (_, oracle) = oracle_with_fee(10);

        let id = oracle.request_entropy("tag", Fee(10)).await.unwrap();
        assert_eq!(oracle.tag(id).as_deref(), Some("tag"));
        assert!(!oracle.is_request_fulfilled(id).await.unwrap());
        assert!(matches!(
            oracle.get_encrypted_entropy(id).await.unwrap_err(),
            OracleError::NotFulfilled(_)
        ));

        let handle = oracle.fulfill_with(id, 0xdead).await.unwrap();
        assert!(oracle.is_request_fulfilled(id).await.unwrap());
        assert_eq!(oracle.get_encrypted_entropy(id).await.unwrap(), handle);
    }

    #[tokio::test]
    async fn test_fee_too_low_rejected() {
        let (_, oracle) = oracle_with_fee(10);

        let err = oracle.request_entropy("tag", Fee(9)).await.unwrap_err();
        assert!(matches!(err, OracleError::FeeTooLow { .. }));
        assert_eq!(oracle.request_count(), 0);
    }

    #[tokio::test]
    async fn test_fee_change_applies_to_new_requests() {
        let (_, oracle) = oracle_with_fee(10);
        let id = oracle.request_entropy("a", Fee(10)).await.unwrap();

        oracle.set_fee(Fee(25));
        assert_eq!(oracle.get_fee().await.unwrap(), Fee(25));
        assert!(oracle.request_entropy("b", Fee(10)).await.is_err());

        // The earlier request is unaffected.
        assert_eq!(oracle.fee_paid(id), Some(Fee(10)));
    }

    #[tokio::test]
    async fn test_double_fulfill_rejected() {
        let (_, oracle) = oracle_with_fee(0);
        let id = oracle.request_entropy("tag", Fee::ZERO).await.unwrap();

        oracle.fulfill_with(id, 1).await.unwrap();
        let err = oracle.fulfill_with(id, 2).await.unwrap_err();
        assert!(matches!(err, OracleError::AlreadyFulfilled(_)));
    }

    #[tokio::test]
    async fn test_unknown_request() {
        let (_, oracle) = oracle_with_fee(0);
        let ghost = RequestId(404);
        assert!(matches!(
            oracle.is_request_fulfilled(ghost).await.unwrap_err(),
            OracleError::UnknownRequest(_)
        ));
    }
}
