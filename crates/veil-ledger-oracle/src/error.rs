//! Error types for the entropy oracle seam.

use thiserror::Error;

use veil_ledger_core::{Fee, RequestId};

/// Errors that can occur at the oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The request id was never issued by this oracle.
    #[error("unknown entropy request: {0}")]
    UnknownRequest(RequestId),

    /// The attached fee is below the quoted fee.
    #[error("attached fee {attached} below quoted fee {quoted}")]
    FeeTooLow { quoted: Fee, attached: Fee },

    /// The request has already been fulfilled.
    #[error("request already fulfilled: {0}")]
    AlreadyFulfilled(RequestId),

    /// The entropy for this request has not been produced yet.
    #[error("request not fulfilled yet: {0}")]
    NotFulfilled(RequestId),

    /// Producing or storing the entropy ciphertext failed.
    #[error("entropy backend error: {0}")]
    Backend(#[from] veil_ledger_fhe::FheError),
}

/// Result type for oracle operations.
pub type Result<T> = std::result::Result<T, OracleError>;
