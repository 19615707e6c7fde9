//! Observable ledger events.
//!
//! Every successful state transition appends a record to an ordered,
//! append-only log. External watchers consume the log as a stream; records
//! are never edited or removed.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::types::{RequestId, UserId};

/// An event emitted by a ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// The encrypted value was stored at initialization.
    ValueStored {
        /// Who initialized the ledger.
        caller: UserId,
    },

    /// A user was granted permanent decrypt access.
    UserAllowed {
        /// The user that was granted access.
        user: UserId,
    },

    /// A user's access was revoked.
    ///
    /// Declared in the taxonomy but not emitted by any current operation;
    /// there is no revoke operation. Watchers should still accept it.
    UserRevoked {
        /// The user whose access was revoked.
        user: UserId,
    },

    /// A transient-scoped operation was performed for a user.
    TransientOperation {
        /// The user the transient capability was granted to.
        user: UserId,
    },

    /// Entropy was requested from the oracle.
    EntropyRequested {
        /// The oracle-assigned request id.
        request_id: RequestId,
        /// Who paid for the request.
        caller: UserId,
    },

    /// An entropy request was consumed to grant access to a derived value.
    EntropyAccessGranted {
        /// The request whose entropy was mixed in.
        request_id: RequestId,
        /// The user granted access to the derived value.
        user: UserId,
    },
}

/// A single entry in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 1 and strictly increasing.
    pub seq: u64,

    /// When the event was appended (Unix milliseconds).
    pub at: i64,

    /// The event itself.
    pub event: LedgerEvent,
}

impl EventRecord {
    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).expect("CBOR serialization failed");
        buf
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| CoreError::Decoding(e.to_string()))
    }
}

/// An ordered, append-only event log.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Create a new empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, assigning it the next sequence number.
    pub fn append(&mut self, event: LedgerEvent) -> &EventRecord {
        let seq = self.records.len() as u64 + 1;
        self.records.push(EventRecord {
            seq,
            at: now_millis(),
            event,
        });
        self.records.last().expect("just pushed")
    }

    /// Number of records in the log.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over records in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    /// Get a record by sequence number.
    pub fn get(&self, seq: u64) -> Option<&EventRecord> {
        if seq == 0 {
            return None;
        }
        self.records.get(seq as usize - 1)
    }

    /// The most recent record, if any.
    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
