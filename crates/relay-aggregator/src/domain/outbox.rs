//! # Outbox
//!
//! Ephemeral record for the two-phase send API: `create_message` records
//! intent without dispatching, `forward_message` consumes the intent and
//! fans out. Useful when a caller wants to attach or pay transport fees in
//! a separate step.
//!
//! Entry lifecycle: `Unknown -> Created -> Sending -> Sent`. Re-creating an
//! existing entry or re-forwarding a sent one is a no-op, not an error;
//! forwarding while the fan-out is still in flight is rejected so no caller
//! observes a receipt before the tracking id settles.

use relay_types::{Hash, InteropAddress};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// Domain-separation tag for outbox keys.
const OUTBOX_KEY_TAG: &[u8] = b"quorum-relay/outbox-key/v1";

/// Status of an outbox entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboxStatus {
    /// Intent recorded, nothing dispatched.
    Created,
    /// Fan-out in flight; the tracking id is not settled yet.
    Sending,
    /// Fan-out performed; the entry is consumed.
    Sent,
}

/// A message created but not necessarily dispatched yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxEntry {
    /// Chain-qualified original sender.
    pub sender: InteropAddress,
    /// Chain-qualified receiver.
    pub destination: InteropAddress,
    /// The caller's payload.
    pub payload: Vec<u8>,
    /// Opaque extension metadata.
    pub attributes: Vec<Vec<u8>>,
    /// Nonce reserved at creation time.
    pub nonce: u64,
    /// Current lifecycle position.
    pub status: OutboxStatus,
    /// Aggregate tracking id recorded when the entry was sent.
    pub outbox_id: Option<Hash>,
}

impl OutboxEntry {
    /// Record intent for a message.
    #[must_use]
    pub fn created(
        sender: InteropAddress,
        destination: InteropAddress,
        payload: Vec<u8>,
        attributes: Vec<Vec<u8>>,
        nonce: u64,
    ) -> Self {
        Self {
            sender,
            destination,
            payload,
            attributes,
            nonce,
            status: OutboxStatus::Created,
            outbox_id: None,
        }
    }

    /// True once the entry has been dispatched.
    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.status == OutboxStatus::Sent
    }

    /// True while a fan-out for this entry is in flight.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.status == OutboxStatus::Sending
    }

    /// Claim the entry for a fan-out attempt.
    pub fn mark_sending(&mut self) {
        self.status = OutboxStatus::Sending;
    }

    /// Mark the entry dispatched and remember the aggregate tracking id.
    pub fn mark_sent(&mut self, outbox_id: Option<Hash>) {
        self.status = OutboxStatus::Sent;
        self.outbox_id = outbox_id;
    }

    /// Roll the entry back to `Created` after a failed fan-out.
    pub fn reset_created(&mut self) {
        self.status = OutboxStatus::Created;
        self.outbox_id = None;
    }
}

/// Deterministic key locating an outbox entry.
///
/// Derived from the message fields only (no nonce), so repeating
/// `create_message` with identical arguments addresses the same entry.
#[must_use]
pub fn outbox_key(
    sender: &InteropAddress,
    destination: &InteropAddress,
    payload: &[u8],
    attributes: &[Vec<u8>],
) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(OUTBOX_KEY_TAG);
    for field in [
        sender.to_string().as_bytes(),
        destination.to_string().as_bytes(),
        payload,
    ] {
        hasher.update((field.len() as u32).to_be_bytes());
        hasher.update(field);
    }
    hasher.update((attributes.len() as u32).to_be_bytes());
    for attribute in attributes {
        hasher.update((attribute.len() as u32).to_be_bytes());
        hasher.update(attribute);
    }
    hasher.finalize().into()
}
