//! The EntropyOracle trait: request/fulfill interface to an external
//! randomness provider.
//!
//! The ledger never produces entropy itself. It pays the oracle's quoted
//! fee, receives a request id, and later fetches the encrypted entropy once
//! the oracle reports the request fulfilled. Fulfillment is asynchronous
//! and out of the ledger's control; the ledger only polls.

use async_trait::async_trait;

use veil_ledger_core::{CiphertextHandle, Fee, RequestId};

use crate::error::Result;

/// Abstract entropy oracle.
#[async_trait]
pub trait EntropyOracle: Send + Sync {
    /// Quote the current fee for one entropy request.
    ///
    /// The quote may change between calls; callers must re-query rather
    /// than cache it.
    async fn get_fee(&self) -> Result<Fee>;

    /// Submit an entropy request.
    ///
    /// `tag` labels the request for the caller's own bookkeeping; the
    /// oracle echoes it back through its own records but never interprets
    /// it. Fails with `FeeTooLow` if the attached fee is below the quote.
    async fn request_entropy(&self, tag: &str, attached_fee: Fee) -> Result<RequestId>;

    /// Whether the entropy for `id` has been produced.
    async fn is_request_fulfilled(&self, id: RequestId) -> Result<bool>;

    /// Fetch the encrypted entropy for a fulfilled request.
    ///
    /// Fails with `NotFulfilled` before fulfillment and `UnknownRequest`
    /// for ids this oracle never issued.
    async fn get_encrypted_entropy(&self, id: RequestId) -> Result<CiphertextHandle>;
}
