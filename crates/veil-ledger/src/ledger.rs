//! The Ledger: a permission ledger over one encrypted value.
//!
//! The ledger owns a single ciphertext handle, a map of users holding
//! permanent decrypt rights, and the single-use bookkeeping for entropy
//! requests. Everything cryptographic is delegated to the injected backend
//! and oracle seams.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use veil_ledger_core::{
    CiphertextHandle, EventLog, Fee, LedgerEvent, OracleRef, RequestId, UserId,
};
use veil_ledger_fhe::{FheBackend, ImportProof};
use veil_ledger_oracle::EntropyOracle;

use crate::error::{LedgerError, Result};

/// Ledger-side record of an entropy request.
#[derive(Debug, Clone)]
pub struct EntropyRequest {
    /// The tag supplied when the request was made.
    pub tag: String,

    /// Who paid for the request.
    pub requested_by: UserId,

    /// Whether the request has been consumed by a grant.
    ///
    /// Flips exactly once; a consumed request is rejected forever after.
    pub consumed: bool,
}

/// The permission ledger.
///
/// State machine per instance: `Uninitialized -> Initialized`. Every
/// operation except construction and [`Ledger::initialize`] requires the
/// initialized state.
///
/// Mutating operations take `&mut self`, so a single instance is serialized
/// by construction; concurrent callers wrap the ledger in their own
/// single-writer lock. Within an operation, every precondition and every
/// delegated call completes before the first ledger-state mutation, so a
/// failure at any point leaves no observable effect.
pub struct Ledger<F: FheBackend, O: EntropyOracle> {
    /// Deploy-time reference to the oracle collaborator. Immutable.
    oracle_ref: OracleRef,
    /// The encryption backend seam.
    fhe: Arc<F>,
    /// The entropy oracle seam.
    oracle: Arc<O>,
    /// The one stored value; `Some` iff initialized.
    stored: Option<CiphertextHandle>,
    /// Users holding permanent decrypt rights.
    allowed: HashSet<UserId>,
    /// Registered entropy requests.
    requests: HashMap<RequestId, EntropyRequest>,
    /// Ordered, append-only event log.
    events: EventLog,
}

impl<F: FheBackend, O: EntropyOracle> fmt::Debug for Ledger<F, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("oracle_ref", &self.oracle_ref)
            .field("stored", &self.stored)
            .field("allowed", &self.allowed)
            .field("requests", &self.requests)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl<F: FheBackend, O: EntropyOracle> Ledger<F, O> {
    /// Construct a ledger bound to the given collaborators.
    ///
    /// Fails with `InvalidReference` if `oracle_ref` is the zero sentinel.
    /// No other side effects.
    pub fn new(oracle_ref: OracleRef, fhe: Arc<F>, oracle: Arc<O>) -> Result<Self> {
        if oracle_ref.is_zero() {
            return Err(LedgerError::InvalidReference);
        }

        Ok(Self {
            oracle_ref,
            fhe,
            oracle,
            stored: None,
            allowed: HashSet::new(),
            requests: HashMap::new(),
            events: EventLog::new(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Initialize the ledger with an externally encrypted value.
    ///
    /// Verifies the proof through the backend, stores the resulting handle,
    /// and keeps the ledger's own access on it. May succeed at most once;
    /// the second call fails `AlreadyInitialized` and the stored value is
    /// unchanged.
    ///
    /// Emits `ValueStored(caller)`.
    pub async fn initialize(
        &mut self,
        caller: UserId,
        sealed: &Bytes,
        proof: &ImportProof,
    ) -> Result<CiphertextHandle> {
        if self.stored.is_some() {
            return Err(LedgerError::AlreadyInitialized);
        }
        if sealed.is_empty() {
            return Err(LedgerError::InvalidReference);
        }

        let handle = self.fhe.import_external(sealed, proof).await?;
        self.fhe.grant_self(&handle).await?;

        self.stored = Some(handle);
        self.events.append(LedgerEvent::ValueStored { caller });
        tracing::debug!(%handle, %caller, "ledger initialized");
        Ok(handle)
    }

    /// Request entropy from the oracle.
    ///
    /// Quotes the oracle's current fee on every call; fails
    /// `InsufficientFee` if the attached fee is below the quote, without
    /// registering anything. On success the returned request id is
    /// registered as pending consumption.
    ///
    /// Emits `EntropyRequested(request_id, caller)`.
    pub async fn request_entropy(
        &mut self,
        caller: UserId,
        tag: &str,
        attached_fee: Fee,
    ) -> Result<RequestId> {
        self.require_initialized()?;

        let quoted = self.oracle.get_fee().await?;
        if attached_fee < quoted {
            return Err(LedgerError::InsufficientFee {
                quoted,
                attached: attached_fee,
            });
        }

        let request_id = self.oracle.request_entropy(tag, attached_fee).await?;

        self.requests.insert(
            request_id,
            EntropyRequest {
                tag: tag.to_string(),
                requested_by: caller,
                consumed: false,
            },
        );
        self.events.append(LedgerEvent::EntropyRequested {
            request_id,
            caller,
        });
        tracing::debug!(%request_id, %caller, "entropy requested");
        Ok(request_id)
    }

    /// Grant `user` permanent decrypt capability on the stored value.
    ///
    /// Fails `InvalidUser` for the null identity and `AlreadyAllowed` if
    /// the user was granted before (by either grant path).
    ///
    /// Emits `UserAllowed(user)`.
    pub async fn allow(&mut self, user: UserId) -> Result<()> {
        let stored = self.require_initialized()?;
        if user.is_null() {
            return Err(LedgerError::InvalidUser);
        }
        if self.allowed.contains(&user) {
            return Err(LedgerError::AlreadyAllowed(user));
        }

        self.fhe.grant_permanent(&stored, &user).await?;

        self.allowed.insert(user);
        self.events.append(LedgerEvent::UserAllowed { user });
        tracing::debug!(%user, "user allowed");
        Ok(())
    }

    /// Perform a transient-scoped operation for `user`.
    ///
    /// Grants the user a capability valid only for this operation on both
    /// the stored value and the derived result, computes
    /// `stored + 1` homomorphically, and returns the derived handle.
    /// Nothing is persisted: the permission map and the stored value are
    /// untouched, so the grant must be repeated on every call.
    ///
    /// Emits `TransientOperation(user)`.
    pub async fn transient_increment(&mut self, user: UserId) -> Result<CiphertextHandle> {
        let stored = self.require_initialized()?;
        if user.is_null() {
            return Err(LedgerError::InvalidUser);
        }

        self.fhe.grant_transient(&stored, &user).await?;
        let derived = self.fhe.add(&stored, 1).await?;
        self.fhe.grant_transient(&derived, &user).await?;

        self.events.append(LedgerEvent::TransientOperation { user });
        Ok(derived)
    }

    /// Consume a fulfilled entropy request to grant `user` access to a
    /// derived value.
    ///
    /// Computes `enhanced = stored ^ entropy` and grants the user permanent
    /// access on `enhanced`, not on the stored base. The base handle is
    /// never replaced: each call derives a fresh value from the unchanged
    /// base and that request's entropy. The request is consumed exactly
    /// once; replays fail `RequestNotConsumable`.
    ///
    /// Emits `EntropyAccessGranted(request_id, user)` then
    /// `UserAllowed(user)`.
    pub async fn grant_with_entropy(
        &mut self,
        user: UserId,
        request_id: RequestId,
    ) -> Result<CiphertextHandle> {
        let stored = self.require_initialized()?;
        if user.is_null() {
            return Err(LedgerError::InvalidUser);
        }
        if self.allowed.contains(&user) {
            return Err(LedgerError::AlreadyAllowed(user));
        }

        let request = self
            .requests
            .get(&request_id)
            .ok_or(LedgerError::UnknownRequest(request_id))?;
        if request.consumed {
            return Err(LedgerError::RequestNotConsumable(request_id));
        }

        if !self.oracle.is_request_fulfilled(request_id).await? {
            return Err(LedgerError::EntropyNotReady(request_id));
        }
        let entropy = self.oracle.get_encrypted_entropy(request_id).await?;

        let enhanced = self.fhe.xor(&stored, &entropy).await?;
        self.fhe.grant_self(&enhanced).await?;
        self.fhe.grant_permanent(&enhanced, &user).await?;

        // All delegated calls succeeded; commit.
        if let Some(request) = self.requests.get_mut(&request_id) {
            request.consumed = true;
        }
        self.allowed.insert(user);
        self.events
            .append(LedgerEvent::EntropyAccessGranted { request_id, user });
        self.events.append(LedgerEvent::UserAllowed { user });
        tracing::debug!(%request_id, %user, %enhanced, "entropy access granted");
        Ok(enhanced)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether the ledger has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.stored.is_some()
    }

    /// Whether `user` holds a permanent grant.
    pub fn is_allowed(&self, user: &UserId) -> bool {
        self.allowed.contains(user)
    }

    /// The stored value's handle.
    pub fn stored_handle(&self) -> Result<CiphertextHandle> {
        self.stored.ok_or(LedgerError::NotInitialized)
    }

    /// The oracle reference fixed at construction.
    pub fn oracle_ref(&self) -> OracleRef {
        self.oracle_ref
    }

    /// Ledger-side record of an entropy request, if registered.
    pub fn entropy_request(&self, id: &RequestId) -> Option<&EntropyRequest> {
        self.requests.get(id)
    }

    /// The event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    fn require_initialized(&self) -> Result<CiphertextHandle> {
        self.stored.ok_or(LedgerError::NotInitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_ledger_fhe::MemoryFhe;
    use veil_ledger_oracle::MemoryOracle;

    fn user(b: u8) -> UserId {
        UserId::from_bytes([b; 32])
    }

    fn make_ledger(fee: u128) -> (Arc<MemoryFhe>, Arc<MemoryOracle>, Ledger<MemoryFhe, MemoryOracle>) {
        let fhe = Arc::new(MemoryFhe::new());
        let oracle = Arc::new(MemoryOracle::new(Arc::clone(&fhe), Fee(fee)));
        let ledger = Ledger::new(
            OracleRef::from_bytes([0x0a; 32]),
            Arc::clone(&fhe),
            Arc::clone(&oracle),
        )
        .unwrap();
        (fhe, oracle, ledger)
    }

    #[test]
    fn test_zero_oracle_ref_rejected() {
        let fhe = Arc::new(MemoryFhe::new());
        let oracle = Arc::new(MemoryOracle::new(Arc::clone(&fhe), Fee::ZERO));
        let err = Ledger::new(OracleRef::ZERO, fhe, oracle).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidReference));
    }

    #[tokio::test]
    async fn test_operations_require_initialization() {
        let (_, _, mut ledger) = make_ledger(0);
        let u = user(1);

        assert!(matches!(
            ledger.allow(u).await.unwrap_err(),
            LedgerError::NotInitialized
        ));
        assert!(matches!(
            ledger.transient_increment(u).await.unwrap_err(),
            LedgerError::NotInitialized
        ));
        assert!(matches!(
            ledger.request_entropy(u, "t", Fee::ZERO).await.unwrap_err(),
            LedgerError::NotInitialized
        ));
        assert!(matches!(
            ledger.grant_with_entropy(u, RequestId(1)).await.unwrap_err(),
            LedgerError::NotInitialized
        ));
        assert!(matches!(
            ledger.stored_handle().unwrap_err(),
            LedgerError::NotInitialized
        ));
        assert!(ledger.events().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_once() {
        let (fhe, _, mut ledger) = make_ledger(0);
        let caller = user(1);
        let (bytes, proof) = fhe.seal_external(42).unwrap();

        let handle = ledger.initialize(caller, &bytes, &proof).await.unwrap();
        assert!(ledger.is_initialized());
        assert_eq!(ledger.stored_handle().unwrap(), handle);
        assert!(fhe.has_self_access(&handle));

        let (bytes2, proof2) = fhe.seal_external(7).unwrap();
        let err = ledger.initialize(caller, &bytes2, &proof2).await.unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyInitialized));

        // Stored value unchanged, exactly one event.
        assert_eq!(ledger.stored_handle().unwrap(), handle);
        assert_eq!(ledger.events().len(), 1);
    }

    #[tokio::test]
    async fn test_initialize_bad_proof_leaves_no_state() {
        let (fhe, _, mut ledger) = make_ledger(0);
        let (bytes, _) = fhe.seal_external(42).unwrap();
        let bad = ImportProof::from_bytes([0xee; 32]);

        let err = ledger.initialize(user(1), &bytes, &bad).await.unwrap_err();
        assert!(matches!(err, LedgerError::Fhe(_)));
        assert!(!ledger.is_initialized());
        assert!(ledger.events().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_empty_input_rejected() {
        let (_, _, mut ledger) = make_ledger(0);
        let proof = ImportProof::compute(b"");

        let err = ledger
            .initialize(user(1), &Bytes::new(), &proof)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidReference));
    }
}
