//! # Domain Module
//!
//! Core domain types for the aggregator: the gateway set with its quorum
//! threshold, the write-once remote registry, the per-message reception
//! tracker, and the two-phase send outbox.

pub mod gateway_set;
pub mod invariants;
pub mod outbox;
pub mod remote_registry;
pub mod tracker;

pub use gateway_set::GatewaySet;
pub use invariants::{
    check_invariants, invariant_no_premature_execution, invariant_threshold_reachable,
    InvariantViolation,
};
pub use outbox::{outbox_key, OutboxEntry, OutboxStatus};
pub use remote_registry::RemoteRegistry;
pub use tracker::{ReceptionTracker, TrackerStatus};
