//! Error types for the encryption backend seam.

use thiserror::Error;

use veil_ledger_core::CiphertextHandle;

/// Errors that can occur in an encryption backend.
#[derive(Debug, Error)]
pub enum FheError {
    /// The import proof does not match the ciphertext.
    #[error("invalid import proof")]
    InvalidProof,

    /// The handle does not refer to a known ciphertext.
    #[error("unknown ciphertext handle: {0}")]
    UnknownHandle(CiphertextHandle),

    /// The ciphertext bytes could not be interpreted.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// Sealing a plaintext failed.
    #[error("seal error: {0}")]
    SealError(String),

    /// Opening a ciphertext failed.
    #[error("open error: {0}")]
    OpenError(String),

    /// The user is not permitted to decrypt the handle.
    #[error("access denied for user {0}")]
    AccessDenied(veil_ledger_core::UserId),
}

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, FheError>;
