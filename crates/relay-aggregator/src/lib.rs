//! # Relay Aggregator
//!
//! N-of-M cross-chain message aggregation and routing.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Route messages between chains without trusting any single bridge:
//! - Fan every message out through M independently operated gateways
//! - Execute on the destination only after N distinct confirmations
//! - Exactly-once execution per quorum, with rollback on downstream failure
//!
//! ## Security Model
//!
//! | Defense | Description |
//! |---------|-------------|
//! | Quorum threshold | Fewer than N colluding gateways cannot forge a message |
//! | Sender validation | Only the registered peer aggregator is accepted per chain |
//! | Write-once registry | Remote bindings cannot be repointed after setup |
//! | Effects-first execution | Reentrant callbacks observe `executed` already set |
//! | Circuit breaker | Owner can pause sends and receptions instantly |
//!
//! ## Module Structure
//!
//! ```text
//! relay-aggregator/
//! ├── domain/          # GatewaySet, RemoteRegistry, ReceptionTracker, outbox
//! ├── ports/           # AggregatorApi/Admin, GatewayTransport, ReceiverDispatch
//! ├── adapters/        # LoopbackGateway
//! ├── service.rs       # AggregatorService
//! ├── state.rs         # Shared mutable state
//! └── metrics.rs       # Prometheus metrics (feature-gated)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod state;

// Re-exports
pub use adapters::LoopbackGateway;
pub use domain::{
    check_invariants, invariant_no_premature_execution, invariant_threshold_reachable,
    outbox_key, GatewaySet, InvariantViolation, OutboxEntry, OutboxStatus, ReceptionTracker,
    RemoteRegistry, TrackerStatus,
};
pub use error::{AggregatorError, AggregatorResult};
pub use ports::inbound::{
    AggregatorAdmin, AggregatorApi, ExecutionOutcome, ExecutionReport, SendReceipt,
};
pub use ports::outbound::{
    ExecutionAck, GatewayTransport, MockGateway, MockReceiver, ReceiverBehavior, ReceiverDispatch,
};
pub use service::{AggregatorConfig, AggregatorService};
pub use state::AggregatorState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
