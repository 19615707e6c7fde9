//! Error types for ledger operations.

use thiserror::Error;

use veil_ledger_core::{Fee, RequestId, UserId};
use veil_ledger_fhe::FheError;
use veil_ledger_oracle::OracleError;

/// Errors that can occur during ledger operations.
///
/// All are hard, synchronous failures: no operation retries internally, and
/// no error path leaves partial state behind.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The oracle reference supplied at construction is the zero sentinel,
    /// or an input reference is empty.
    #[error("invalid reference")]
    InvalidReference,

    /// The ledger has already been initialized.
    #[error("ledger already initialized")]
    AlreadyInitialized,

    /// The operation requires an initialized ledger.
    #[error("ledger not initialized")]
    NotInitialized,

    /// The attached fee is below the oracle's current quote.
    #[error("insufficient fee: attached {attached}, oracle quoted {quoted}")]
    InsufficientFee { quoted: Fee, attached: Fee },

    /// The null identity cannot be granted access.
    #[error("invalid user identity")]
    InvalidUser,

    /// The user already holds a permanent grant.
    #[error("user already allowed: {0}")]
    AlreadyAllowed(UserId),

    /// The request id was never registered with this ledger.
    #[error("unknown entropy request: {0}")]
    UnknownRequest(RequestId),

    /// The request has already been consumed.
    #[error("entropy request no longer consumable: {0}")]
    RequestNotConsumable(RequestId),

    /// The oracle has not fulfilled the request yet.
    #[error("entropy not ready for request: {0}")]
    EntropyNotReady(RequestId),

    /// Encryption backend failure (including `InvalidProof`).
    #[error("encryption backend error: {0}")]
    Fhe(#[from] FheError),

    /// Oracle failure.
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
