//! End-to-end ledger scenarios.
//!
//! Each test drives a fresh ledger through a full story: initialization,
//! plain grants, transient operations, and entropy-augmented grants with
//! oracle fulfillment in between.

use std::sync::Arc;

use veil_ledger::core::{Fee, Keypair, LedgerEvent, OracleRef, RequestId, UserId};
use veil_ledger::fhe::MemoryFhe;
use veil_ledger::oracle::MemoryOracle;
use veil_ledger::{Ledger, LedgerError};

struct Setup {
    fhe: Arc<MemoryFhe>,
    oracle: Arc<MemoryOracle>,
    ledger: Ledger<MemoryFhe, MemoryOracle>,
    owner: UserId,
}

/// Fresh ledger, initialized with `value`, oracle quoting `fee`.
async fn initialized(value: u64, fee: u128) -> Setup {
    // Best effort; later tests in the same process will find it set.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let fhe = Arc::new(MemoryFhe::new());
    let oracle = Arc::new(MemoryOracle::new(Arc::clone(&fhe), Fee(fee)));
    let mut ledger = Ledger::new(
        OracleRef::from_bytes([0x0a; 32]),
        Arc::clone(&fhe),
        Arc::clone(&oracle),
    )
    .unwrap();

    let owner = Keypair::generate().user_id();
    let (sealed, proof) = fhe.seal_external(value).unwrap();
    ledger.initialize(owner, &sealed, &proof).await.unwrap();

    Setup {
        fhe,
        oracle,
        ledger,
        owner,
    }
}

#[tokio::test]
async fn allow_then_duplicate_fails() {
    let mut s = initialized(42, 0).await;
    let user_x = Keypair::generate().user_id();

    s.ledger.allow(user_x).await.unwrap();
    assert!(s.ledger.is_allowed(&user_x));

    // The grant actually gates decryption in the backend.
    let base = s.ledger.stored_handle().unwrap();
    assert_eq!(s.fhe.decrypt_for(&base, &user_x).unwrap(), 42);

    let err = s.ledger.allow(user_x).await.unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyAllowed(_)));
    assert!(s.ledger.is_allowed(&user_x));
}

#[tokio::test]
async fn null_user_rejected_everywhere() {
    let mut s = initialized(1, 0).await;

    assert!(matches!(
        s.ledger.allow(UserId::NULL).await.unwrap_err(),
        LedgerError::InvalidUser
    ));
    assert!(matches!(
        s.ledger.transient_increment(UserId::NULL).await.unwrap_err(),
        LedgerError::InvalidUser
    ));
    assert!(matches!(
        s.ledger
            .grant_with_entropy(UserId::NULL, RequestId(1))
            .await
            .unwrap_err(),
        LedgerError::InvalidUser
    ));
}

#[tokio::test]
async fn insufficient_fee_registers_nothing() {
    let mut s = initialized(1, 10).await;

    let err = s
        .ledger
        .request_entropy(s.owner, "mix", Fee(9))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientFee {
            quoted: Fee(10),
            attached: Fee(9),
        }
    ));
    assert_eq!(s.oracle.request_count(), 0);
    // Only the init event is in the log.
    assert_eq!(s.ledger.events().len(), 1);
}

#[tokio::test]
async fn fee_is_requoted_per_call() {
    let mut s = initialized(1, 10).await;

    s.ledger
        .request_entropy(s.owner, "a", Fee(10))
        .await
        .unwrap();

    // The oracle raises its price; the old fee no longer clears.
    s.oracle.set_fee(Fee(30));
    let err = s
        .ledger
        .request_entropy(s.owner, "b", Fee(10))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFee { .. }));

    s.ledger
        .request_entropy(s.owner, "b", Fee(30))
        .await
        .unwrap();
}

#[tokio::test]
async fn entropy_grant_full_lifecycle() {
    let mut s = initialized(42, 10).await;
    let user_y = Keypair::generate().user_id();
    let user_z = Keypair::generate().user_id();

    let id = s
        .ledger
        .request_entropy(s.owner, "mix", Fee(10))
        .await
        .unwrap();

    // Not fulfilled yet.
    let err = s.ledger.grant_with_entropy(user_y, id).await.unwrap_err();
    assert!(matches!(err, LedgerError::EntropyNotReady(_)));
    assert!(!s.ledger.is_allowed(&user_y));
    assert!(!s.ledger.entropy_request(&id).unwrap().consumed);

    s.oracle.fulfill_with(id, 0xff).await.unwrap();

    let enhanced = s.ledger.grant_with_entropy(user_y, id).await.unwrap();
    assert!(s.ledger.is_allowed(&user_y));
    assert!(s.ledger.entropy_request(&id).unwrap().consumed);

    // Access is to the derived value, not the base.
    assert_eq!(s.fhe.decrypt_for(&enhanced, &user_y).unwrap(), 42 ^ 0xff);
    let base = s.ledger.stored_handle().unwrap();
    assert_ne!(enhanced, base);
    assert!(s.fhe.decrypt_for(&base, &user_y).is_err());

    // Replay with another user fails; nothing granted to them.
    let err = s.ledger.grant_with_entropy(user_z, id).await.unwrap_err();
    assert!(matches!(err, LedgerError::RequestNotConsumable(_)));
    assert!(!s.ledger.is_allowed(&user_z));
}

#[tokio::test]
async fn entropy_grant_unknown_request() {
    let mut s = initialized(1, 0).await;
    let user = Keypair::generate().user_id();

    let err = s
        .ledger
        .grant_with_entropy(user, RequestId(404))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::UnknownRequest(_)));
}

#[tokio::test]
async fn entropy_grant_respects_already_allowed() {
    let mut s = initialized(1, 0).await;
    let user = Keypair::generate().user_id();
    s.ledger.allow(user).await.unwrap();

    let id = s
        .ledger
        .request_entropy(s.owner, "mix", Fee::ZERO)
        .await
        .unwrap();
    s.oracle.fulfill_with(id, 7).await.unwrap();

    let err = s.ledger.grant_with_entropy(user, id).await.unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyAllowed(_)));
    // The request survives for another user.
    assert!(!s.ledger.entropy_request(&id).unwrap().consumed);
}

#[tokio::test]
async fn transient_operation_persists_nothing() {
    let mut s = initialized(41, 0).await;
    let user = Keypair::generate().user_id();
    let base = s.ledger.stored_handle().unwrap();

    let derived = s.ledger.transient_increment(user).await.unwrap();
    assert_eq!(s.fhe.decrypt_for(&derived, &user).unwrap(), 42);
    assert_eq!(s.fhe.decrypt_for(&base, &user).unwrap(), 41);

    // No permanent rights, no change to the stored base.
    assert!(!s.ledger.is_allowed(&user));
    assert!(!s.fhe.has_permanent_access(&base, &user));
    assert!(!s.fhe.has_permanent_access(&derived, &user));
    assert_eq!(s.ledger.stored_handle().unwrap(), base);

    // Once the platform closes the operation scope, access is gone and a
    // repeat call has to grant again.
    s.fhe.end_transient_scope();
    assert!(s.fhe.decrypt_for(&base, &user).is_err());

    let derived2 = s.ledger.transient_increment(user).await.unwrap();
    assert_eq!(s.fhe.decrypt_for(&derived2, &user).unwrap(), 42);
    assert_eq!(s.ledger.stored_handle().unwrap(), base);

    // Each call is observable: one TransientOperation record per call.
    let transient_events = s
        .ledger
        .events()
        .iter()
        .filter(|r| r.event == LedgerEvent::TransientOperation { user })
        .count();
    assert_eq!(transient_events, 2);
}

#[tokio::test]
async fn event_log_order_and_contents() {
    let mut s = initialized(42, 5).await;
    let user_x = Keypair::generate().user_id();
    let user_y = Keypair::generate().user_id();
    let passerby = Keypair::generate().user_id();

    s.ledger.allow(user_x).await.unwrap();
    s.ledger.transient_increment(passerby).await.unwrap();

    let id = s
        .ledger
        .request_entropy(s.owner, "mix", Fee(5))
        .await
        .unwrap();
    s.oracle.fulfill_with(id, 1).await.unwrap();
    s.ledger.grant_with_entropy(user_y, id).await.unwrap();

    let events: Vec<&LedgerEvent> = s.ledger.events().iter().map(|r| &r.event).collect();
    assert_eq!(
        events,
        vec![
            &LedgerEvent::ValueStored { caller: s.owner },
            &LedgerEvent::UserAllowed { user: user_x },
            &LedgerEvent::TransientOperation { user: passerby },
            &LedgerEvent::EntropyRequested {
                request_id: id,
                caller: s.owner,
            },
            &LedgerEvent::EntropyAccessGranted {
                request_id: id,
                user: user_y,
            },
            &LedgerEvent::UserAllowed { user: user_y },
        ]
    );

    // Sequence numbers are contiguous from 1.
    let seqs: Vec<u64> = s.ledger.events().iter().map(|r| r.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn oracle_ref_is_fixed() {
    let s = initialized(1, 0).await;
    assert_eq!(s.ledger.oracle_ref(), OracleRef::from_bytes([0x0a; 32]));
}
