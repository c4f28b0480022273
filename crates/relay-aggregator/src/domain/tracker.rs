//! # Reception Tracker
//!
//! Per-message bookkeeping: which gateways confirmed delivery and whether
//! the message has been executed.
//!
//! `received_by` is monotonic (append-only) and trackers are never deleted;
//! the ledger is permanent so replay safety holds for the lifetime of the
//! system.
//!
//! State machine per message id:
//!
//! ```text
//! NotSeen -> PartiallyConfirmed(count < N) -> Executed
//!                     ^                          |
//!                     └── failed downstream call ┘
//! ```
//!
//! `Executed -> PartiallyConfirmed` happens only through the explicit
//! rollback after a failed downstream call, never through an external call
//! forcing it back.

use relay_types::GatewayId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Reception and execution bookkeeping for one message id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceptionTracker {
    received_by: BTreeSet<GatewayId>,
    executed: bool,
}

impl ReceptionTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a gateway confirmation.
    ///
    /// Returns `true` when the gateway had not confirmed before. Duplicates
    /// return `false` and leave the count unchanged.
    pub fn confirm(&mut self, gateway: GatewayId) -> bool {
        self.received_by.insert(gateway)
    }

    /// Whether this gateway already confirmed.
    #[must_use]
    pub fn has_confirmed(&self, gateway: &GatewayId) -> bool {
        self.received_by.contains(gateway)
    }

    /// Number of distinct confirming gateways.
    #[must_use]
    pub fn count_received(&self) -> usize {
        self.received_by.len()
    }

    /// Whether the message has been executed.
    #[must_use]
    pub fn executed(&self) -> bool {
        self.executed
    }

    /// Commit execution. Set strictly before the downstream call.
    pub fn mark_executed(&mut self) {
        self.executed = true;
    }

    /// Roll back after an observed downstream failure. Confirmations are
    /// untouched, so the message stays retryable without double-counting.
    pub fn reset_executed(&mut self) {
        self.executed = false;
    }

    /// The tracker's position in the per-message state machine.
    #[must_use]
    pub fn status(&self) -> TrackerStatus {
        if self.executed {
            TrackerStatus::Executed
        } else if self.received_by.is_empty() {
            TrackerStatus::NotSeen
        } else {
            TrackerStatus::PartiallyConfirmed {
                confirmations: self.received_by.len(),
            }
        }
    }
}

/// Observable per-message state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackerStatus {
    /// No gateway has reported this message.
    NotSeen,
    /// Some confirmations recorded, execution not (or no longer) committed.
    PartiallyConfirmed {
        /// Distinct confirming gateways so far.
        confirmations: usize,
    },
    /// Executed; further gateway reports are silent no-ops.
    Executed,
}
