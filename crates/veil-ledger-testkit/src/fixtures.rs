//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a backend, an oracle sharing
//! it, a constructed ledger, and a handful of named identities.

use std::sync::Arc;

use veil_ledger::Ledger;
use veil_ledger_core::{Fee, Keypair, OracleRef, UserId};
use veil_ledger_fhe::MemoryFhe;
use veil_ledger_oracle::MemoryOracle;

/// Default oracle reference used by fixtures.
pub const FIXTURE_ORACLE_REF: OracleRef = OracleRef::from_bytes([0x0a; 32]);

/// A test fixture wiring a ledger to in-memory collaborators.
pub struct TestFixture {
    pub fhe: Arc<MemoryFhe>,
    pub oracle: Arc<MemoryOracle>,
    pub ledger: Ledger<MemoryFhe, MemoryOracle>,
    pub owner: Keypair,
}

impl TestFixture {
    /// Create a fixture with the oracle quoting the given fee.
    pub fn with_fee(fee: Fee) -> Self {
        let fhe = Arc::new(MemoryFhe::new());
        let oracle = Arc::new(MemoryOracle::new(Arc::clone(&fhe), fee));
        let ledger = Ledger::new(FIXTURE_ORACLE_REF, Arc::clone(&fhe), Arc::clone(&oracle))
            .expect("fixture oracle ref is non-zero");

        Self {
            fhe,
            oracle,
            ledger,
            owner: Keypair::generate(),
        }
    }

    /// Create a fixture with a zero oracle fee.
    pub fn new() -> Self {
        Self::with_fee(Fee::ZERO)
    }

    /// The owner's identity.
    pub fn owner_id(&self) -> UserId {
        self.owner.user_id()
    }

    /// Initialize the ledger with `value` as the owner.
    pub async fn initialize_with(&mut self, value: u64) {
        let (sealed, proof) = self.fhe.seal_external(value).expect("seal fixture value");
        self.ledger
            .initialize(self.owner.user_id(), &sealed, &proof)
            .await
            .expect("fixture initialization");
    }

    /// A fresh user identity.
    pub fn new_user(&self) -> UserId {
        Keypair::generate().user_id()
    }

    /// A deterministic user identity from a seed byte.
    pub fn seeded_user(&self, seed: u8) -> UserId {
        Keypair::from_seed(&[seed; 32]).user_id()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
