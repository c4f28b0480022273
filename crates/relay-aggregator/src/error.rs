//! Error types for the aggregator.
//!
//! Categories:
//! - Configuration: gateway already/not registered, unreachable threshold,
//!   remote chain already bound. Fatal, reject, no state change.
//! - Authorization: sender mismatch, unauthorized operator, paused system.
//!   Fatal, reject.
//! - Protocol: unknown destination/source chain, malformed wire bytes.
//!   Fatal, reject.
//! - Execution: downstream receiver failed. Recoverable - never surfaced
//!   through a `Result`; the tracker rolls back and `ExecutionFailed` is
//!   emitted instead, so the reporting gateway's own call still succeeds.

use relay_types::{hash_hex, ChainRef, GatewayId, Hash, InteropAddress, OperatorId, RelayTypesError};
use thiserror::Error;

/// Aggregator error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregatorError {
    /// Gateway is already a member of the active set.
    #[error("Gateway already registered: {gateway}")]
    GatewayAlreadyRegistered {
        /// The duplicate gateway.
        gateway: GatewayId,
    },

    /// Gateway is not a member of the active set.
    #[error("Gateway not registered: {gateway}")]
    GatewayNotRegistered {
        /// The unknown gateway.
        gateway: GatewayId,
    },

    /// Removing the gateway would leave fewer members than the threshold.
    #[error("Threshold violation: {gateways} gateways cannot satisfy threshold {threshold}")]
    ThresholdViolation {
        /// Gateways that would remain.
        gateways: usize,
        /// Current threshold.
        threshold: usize,
    },

    /// Requested threshold is zero or exceeds the active set size.
    #[error("Invalid threshold {requested} for {gateways} gateways")]
    InvalidThreshold {
        /// The rejected value.
        requested: usize,
        /// Current active set size.
        gateways: usize,
    },

    /// A remote aggregator is already bound for this chain (write-once).
    #[error("Remote aggregator already registered for chain {chain}")]
    RemoteAlreadyRegistered {
        /// The chain with an existing binding.
        chain: ChainRef,
    },

    /// No remote aggregator is registered for this chain.
    #[error("Unknown chain: {chain}")]
    UnknownChain {
        /// The unregistered chain.
        chain: ChainRef,
    },

    /// Reported cross-chain sender does not match the registered remote
    /// aggregator for the source chain.
    #[error("Invalid cross-chain sender: expected {expected}, got {got}")]
    InvalidCrosschainSender {
        /// The registered remote aggregator.
        expected: InteropAddress,
        /// The sender the gateway reported.
        got: InteropAddress,
    },

    /// A non-gateway caller tried to re-trigger an executed message.
    #[error("Message already executed: {}", hash_hex(message_id))]
    AlreadyExecuted {
        /// The executed message.
        message_id: Hash,
    },

    /// The circuit breaker is engaged.
    #[error("System is paused")]
    SystemPaused,

    /// Unpause requested while the system is running.
    #[error("System is not paused")]
    NotPaused,

    /// The caller is not the configured owner.
    #[error("Unauthorized operator: {operator}")]
    UnauthorizedOperator {
        /// The rejected caller.
        operator: OperatorId,
    },

    /// A gateway transport rejected the fan-out call; the whole send fails.
    #[error("Gateway {gateway} send failed: {reason}")]
    GatewaySendFailed {
        /// The failing gateway.
        gateway: GatewayId,
        /// Transport-reported reason.
        reason: String,
    },

    /// Transport-level failure inside a gateway adapter.
    #[error("Transport error: {reason}")]
    Transport {
        /// What went wrong.
        reason: String,
    },

    /// Downstream receiver failure inside a dispatch adapter.
    #[error("Downstream receiver error: {reason}")]
    Downstream {
        /// What went wrong.
        reason: String,
    },

    /// No outbox entry exists for this key.
    #[error("Outbox entry not found: {}", hash_hex(outbox_key))]
    OutboxEntryNotFound {
        /// The unknown key.
        outbox_key: Hash,
    },

    /// A fan-out for this outbox entry is already in flight.
    #[error("Forward already in progress for outbox entry {}", hash_hex(outbox_key))]
    ForwardInProgress {
        /// The contested key.
        outbox_key: Hash,
    },

    /// Identity parsing or envelope decoding failed.
    #[error(transparent)]
    Codec(#[from] RelayTypesError),
}

/// Result type for aggregator operations.
pub type AggregatorResult<T> = Result<T, AggregatorError>;
