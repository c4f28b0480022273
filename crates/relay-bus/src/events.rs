//! # Relay Events
//!
//! All event types that flow through the relay bus. Every observable state
//! transition of the aggregator maps to exactly one variant.

use relay_types::{ChainRef, GatewayId, Hash, InteropAddress, Message};
use serde::{Deserialize, Serialize};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayEvent {
    // =========================================================================
    // OUTBOUND DISPATCH
    // =========================================================================
    /// A message was fanned out to every active gateway.
    ///
    /// Emitted exactly once per successful send, whether or not any gateway
    /// returned a tracking id; `outbox_id` is present only when at least one
    /// did. This is the stable correlation anchor for off-chain observers.
    MessagePosted {
        /// Aggregate hash of the collected `(gateway, tracking id)` pairs.
        outbox_id: Option<Hash>,
        /// The logical message as submitted (pre-envelope payload).
        message: Message,
    },

    // =========================================================================
    // RECEPTION & QUORUM
    // =========================================================================
    /// A recognized gateway confirmed delivery of a message for the first
    /// time. Duplicate confirmations do not re-emit this event.
    MessageReceived {
        /// Deterministic message id.
        message_id: Hash,
        /// The confirming gateway.
        gateway: GatewayId,
    },

    // =========================================================================
    // EXECUTION
    // =========================================================================
    /// Quorum was reached and the destination receiver accepted the message.
    ExecutionSuccess {
        /// Deterministic message id.
        message_id: Hash,
    },

    /// Quorum was reached but the receiver failed or returned the wrong
    /// acknowledgement; the tracker rolled back to a retryable state.
    ExecutionFailed {
        /// Deterministic message id.
        message_id: Hash,
    },

    // =========================================================================
    // ADMINISTRATION
    // =========================================================================
    /// A gateway joined the active set.
    GatewayAdded {
        /// The new member.
        gateway: GatewayId,
    },

    /// A gateway left the active set.
    GatewayRemoved {
        /// The removed member.
        gateway: GatewayId,
    },

    /// The quorum threshold changed.
    ThresholdUpdated {
        /// New value of N.
        threshold: usize,
    },

    /// A remote aggregator was bound to a chain (write-once).
    RemoteRegistered {
        /// The remote chain.
        chain: ChainRef,
        /// The peer aggregator trusted on that chain.
        aggregator: InteropAddress,
    },

    /// The circuit breaker engaged; sends and receptions are rejected.
    Paused,

    /// The circuit breaker disengaged.
    Unpaused,
}

impl RelayEvent {
    /// Get the topic this event belongs to.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::MessagePosted { .. } => EventTopic::Outbound,
            Self::MessageReceived { .. } => EventTopic::Reception,
            Self::ExecutionSuccess { .. } | Self::ExecutionFailed { .. } => EventTopic::Execution,
            Self::GatewayAdded { .. }
            | Self::GatewayRemoved { .. }
            | Self::ThresholdUpdated { .. }
            | Self::RemoteRegistered { .. }
            | Self::Paused
            | Self::Unpaused => EventTopic::Admin,
        }
    }
}

/// Coarse routing topics for event subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Source-side dispatch events.
    Outbound,
    /// Destination-side per-gateway confirmations.
    Reception,
    /// Execution outcomes (success and rollback).
    Execution,
    /// Gateway set, threshold, registry, and pause mutations.
    Admin,
    /// Matches every topic.
    All,
}

/// Filter for event subscriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &RelayEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
