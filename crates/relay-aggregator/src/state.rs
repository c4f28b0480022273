//! Internal mutable state for the aggregator service.

use crate::domain::{GatewaySet, OutboxEntry, ReceptionTracker, RemoteRegistry, TrackerStatus};
use relay_types::Hash;
use std::collections::HashMap;

/// Everything the service mutates, guarded by a single lock.
///
/// Trackers are never removed; the reception ledger is permanent so replay
/// safety holds for the lifetime of the process.
pub struct AggregatorState {
    /// Active gateway set and quorum threshold.
    pub gateways: GatewaySet,
    /// Write-once chain-to-peer-aggregator bindings.
    pub remotes: RemoteRegistry,
    /// Per-message reception and execution ledger.
    pub trackers: HashMap<Hash, ReceptionTracker>,
    /// Two-phase send intents by outbox key.
    pub outbox: HashMap<Hash, OutboxEntry>,
    /// Next nonce to embed in an outbound envelope.
    pub next_nonce: u64,
    /// Circuit breaker flag.
    pub paused: bool,
}

impl AggregatorState {
    /// Fresh, unconfigured state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gateways: GatewaySet::new(),
            remotes: RemoteRegistry::new(),
            trackers: HashMap::new(),
            outbox: HashMap::new(),
            next_nonce: 0,
            paused: false,
        }
    }

    /// Reserve the next strictly increasing nonce.
    pub fn assign_nonce(&mut self) -> u64 {
        let nonce = self.next_nonce;
        self.next_nonce += 1;
        nonce
    }

    /// Observable status for a message id.
    #[must_use]
    pub fn tracker_status(&self, message_id: &Hash) -> TrackerStatus {
        self.trackers
            .get(message_id)
            .map_or(TrackerStatus::NotSeen, ReceptionTracker::status)
    }
}

impl Default for AggregatorState {
    fn default() -> Self {
        Self::new()
    }
}
