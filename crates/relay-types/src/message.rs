//! # Message Model and Id Derivation
//!
//! The logical message as submitted by a sender, plus the deterministic
//! Keccak-256 derivations for message ids and outbox ids.
//!
//! A message exists only transiently as call arguments; its persistent trace
//! on the destination side is the `MessageId` and its reception tracker.

use crate::identity::{ChainRef, GatewayId, Hash, InteropAddress};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// A logical cross-chain message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Chain-qualified sender.
    pub source: InteropAddress,
    /// Chain-qualified receiver.
    pub destination: InteropAddress,
    /// Opaque payload.
    pub payload: Vec<u8>,
    /// Opaque extension metadata; order-significant, content-opaque.
    pub attributes: Vec<Vec<u8>>,
}

/// Domain-separation tags for the two hash derivations.
const MESSAGE_ID_TAG: &[u8] = b"quorum-relay/message-id/v1";
const OUTBOX_ID_TAG: &[u8] = b"quorum-relay/outbox-id/v1";

/// Derive the deterministic message id.
///
/// Hashed over `(source chain, outer sender, outer payload, attributes)`
/// with every field length-prefixed. The outer payload is the encoded wire
/// envelope, so the strictly increasing nonce embedded there makes ids
/// unique even for otherwise identical sends.
pub fn message_id(
    source_chain: &ChainRef,
    sender: &InteropAddress,
    payload: &[u8],
    attributes: &[Vec<u8>],
) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(MESSAGE_ID_TAG);
    update_prefixed(&mut hasher, source_chain.to_string().as_bytes());
    update_prefixed(&mut hasher, sender.to_string().as_bytes());
    update_prefixed(&mut hasher, payload);
    hasher.update((attributes.len() as u32).to_be_bytes());
    for attribute in attributes {
        update_prefixed(&mut hasher, attribute);
    }
    hasher.finalize().into()
}

/// Derive the aggregate outbox id from the per-gateway tracking ids
/// collected during a fan-out.
pub fn outbox_id(tracked: &[(GatewayId, Hash)]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(OUTBOX_ID_TAG);
    hasher.update((tracked.len() as u32).to_be_bytes());
    for (gateway, tracking) in tracked {
        update_prefixed(&mut hasher, gateway.0.as_bytes());
        hasher.update(tracking);
    }
    hasher.finalize().into()
}

fn update_prefixed(hasher: &mut Keccak256, bytes: &[u8]) {
    hasher.update((bytes.len() as u32).to_be_bytes());
    hasher.update(bytes);
}
