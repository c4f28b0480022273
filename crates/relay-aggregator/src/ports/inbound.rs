//! # Inbound Ports
//!
//! API traits defining what the aggregator can do: the message path
//! ([`AggregatorApi`]) and the owner-gated administrative surface
//! ([`AggregatorAdmin`]).

use crate::domain::TrackerStatus;
use crate::error::AggregatorResult;
use crate::ports::outbound::GatewayTransport;
use relay_types::{ChainRef, GatewayId, Hash, InteropAddress, OperatorId};
use async_trait::async_trait;
use std::sync::Arc;

/// Receipt returned by a successful fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// Aggregate hash of collected `(gateway, tracking id)` pairs, when at
    /// least one gateway returned a tracking id.
    pub outbox_id: Option<Hash>,
    /// The nonce embedded in the dispatched envelope.
    pub nonce: u64,
}

/// What a reception call did, for callers and tests observing transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Deterministic id of the reported message.
    pub message_id: Hash,
    /// Whether this call added a new gateway confirmation.
    pub newly_recorded: bool,
    /// Distinct confirmations after this call.
    pub confirmations: usize,
    /// Whether the tracker is executed after this call settled.
    pub executed: bool,
    /// Downstream invocation triggered by this call, if any.
    pub report: ExecutionReport,
}

/// Result of the downstream receiver invocation within one reception call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionReport {
    /// Quorum not newly satisfied by this call; nothing was invoked.
    NotAttempted,
    /// Receiver accepted the message with the expected acknowledgement.
    Succeeded,
    /// Receiver failed or returned the wrong acknowledgement; the tracker
    /// rolled back and the message is retryable.
    Failed,
}

/// Primary aggregator API - inbound port for the message path.
#[async_trait]
pub trait AggregatorApi: Send + Sync {
    /// Broadcast one logical message through every active gateway.
    ///
    /// Atomic: if any gateway call fails the whole send fails and nothing
    /// is reported posted.
    async fn send_message(
        &self,
        sender_account: &str,
        destination: InteropAddress,
        payload: Vec<u8>,
        attributes: Vec<Vec<u8>>,
    ) -> AggregatorResult<SendReceipt>;

    /// First half of the two-phase send: record intent without dispatching.
    ///
    /// Idempotent; re-creating an existing entry returns the same key.
    async fn create_message(
        &self,
        sender_account: &str,
        destination: InteropAddress,
        payload: Vec<u8>,
        attributes: Vec<Vec<u8>>,
    ) -> AggregatorResult<Hash>;

    /// Second half of the two-phase send: consume the intent and dispatch.
    ///
    /// Forwarding an already-sent entry is a no-op returning the original
    /// receipt.
    async fn forward_message(&self, outbox_key: Hash) -> AggregatorResult<SendReceipt>;

    /// Reception entrypoint invoked by whichever gateway delivered the
    /// message on this (destination) chain.
    ///
    /// The calling identity determines which gateway is reporting;
    /// unrecognized callers contribute no confirmation but may still
    /// trigger a retry once quorum is already met.
    async fn execute_message(
        &self,
        caller: GatewayId,
        source_chain: ChainRef,
        sender: InteropAddress,
        payload: Vec<u8>,
        attributes: Vec<Vec<u8>>,
    ) -> AggregatorResult<ExecutionOutcome>;

    /// Per-message state, `NotSeen` for unknown ids.
    fn tracker_status(&self, message_id: &Hash) -> TrackerStatus;

    /// Ids of the active gateway set.
    fn active_gateways(&self) -> Vec<GatewayId>;

    /// Current quorum threshold N.
    fn threshold(&self) -> usize;

    /// The registered peer aggregator for a chain.
    fn remote_aggregator(&self, chain: &ChainRef) -> AggregatorResult<InteropAddress>;

    /// Whether the circuit breaker is engaged.
    fn is_paused(&self) -> bool;
}

/// Administrative API - owner-gated mutations of the gateway set, the
/// threshold, the remote registry, and the pause switch.
///
/// Every operation authorizes the operator before touching state; the
/// check is an explicit capability comparison, not ambient authority.
#[async_trait]
pub trait AggregatorAdmin: Send + Sync {
    /// Add a gateway (and its transport) to the active set.
    async fn add_gateway(
        &self,
        operator: &OperatorId,
        transport: Arc<dyn GatewayTransport>,
    ) -> AggregatorResult<()>;

    /// Remove a gateway from the active set.
    async fn remove_gateway(
        &self,
        operator: &OperatorId,
        gateway: &GatewayId,
    ) -> AggregatorResult<()>;

    /// Update the quorum threshold.
    async fn set_threshold(&self, operator: &OperatorId, threshold: usize)
        -> AggregatorResult<()>;

    /// Bind the peer aggregator trusted on a remote chain. Write-once.
    async fn register_remote_aggregator(
        &self,
        operator: &OperatorId,
        chain: ChainRef,
        aggregator: InteropAddress,
    ) -> AggregatorResult<()>;

    /// Engage the circuit breaker; sends and receptions reject while paused.
    async fn pause(&self, operator: &OperatorId) -> AggregatorResult<()>;

    /// Disengage the circuit breaker.
    async fn unpause(&self, operator: &OperatorId) -> AggregatorResult<()>;
}
