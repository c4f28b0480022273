//! # Outbound Ports
//!
//! Traits for the external collaborators the aggregator depends on: the
//! transport gateways on the source side and the destination receiver
//! dispatch on the destination side. Mock implementations for testing live
//! alongside the traits.

use crate::error::{AggregatorError, AggregatorResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use relay_types::{ChainRef, GatewayId, Hash, InteropAddress};
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// A transport gateway - outbound port.
///
/// One of the M independently operated adapters a message is fanned out
/// through. The aggregator passes the envelope and attributes through
/// unmodified, addressed at the remote aggregator registered for the
/// destination chain.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    /// Stable identity of this gateway within the active set.
    fn id(&self) -> GatewayId;

    /// Deliver the envelope to the destination aggregator.
    ///
    /// Returns a per-call tracking id when the transport supports tracking,
    /// `None` otherwise.
    async fn send(
        &self,
        destination: &InteropAddress,
        envelope: &[u8],
        attributes: &[Vec<u8>],
    ) -> AggregatorResult<Option<Hash>>;
}

/// Dispatch to the destination receiver - outbound port.
///
/// Invoked at most once per quorum; the receiver must answer with the
/// expected acknowledgement for the execution to count.
#[async_trait]
pub trait ReceiverDispatch: Send + Sync {
    /// Invoke the receiver's execution entrypoint.
    async fn execute_message(
        &self,
        receiver: &InteropAddress,
        source_chain: &ChainRef,
        sender: &InteropAddress,
        payload: &[u8],
        attributes: &[Vec<u8>],
    ) -> AggregatorResult<ExecutionAck>;
}

/// Acknowledgement value a receiver returns to confirm it handled the
/// message. Anything other than [`ExecutionAck::expected`] counts as a
/// failed execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionAck(pub [u8; 4]);

impl ExecutionAck {
    /// Magic acknowledgement bytes (first four bytes of
    /// Keccak-256("quorum-relay/execute-ack/v1")).
    pub const MAGIC: [u8; 4] = [0x9c, 0x41, 0xee, 0x27];

    /// The acknowledgement the aggregator requires.
    #[must_use]
    pub fn expected() -> Self {
        Self(Self::MAGIC)
    }

    /// True when this ack matches the expected value.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        self.0 == Self::MAGIC
    }
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// One recorded fan-out call on a [`MockGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRecord {
    /// Destination aggregator the call was addressed at.
    pub destination: InteropAddress,
    /// The encoded envelope bytes.
    pub envelope: Vec<u8>,
    /// Attributes passed through unmodified.
    pub attributes: Vec<Vec<u8>>,
}

/// Mock gateway transport recording every send.
pub struct MockGateway {
    id: GatewayId,
    /// Whether this transport returns tracking ids.
    tracked: bool,
    /// Fail the next sends when set.
    should_fail: AtomicBool,
    /// Every send observed, in order.
    sent: Mutex<Vec<SentRecord>>,
}

impl MockGateway {
    /// A gateway that acknowledges sends with fresh tracking ids.
    #[must_use]
    pub fn tracked(name: &str) -> Self {
        Self::new(name, true)
    }

    /// A gateway whose transport has no tracking support.
    #[must_use]
    pub fn untracked(name: &str) -> Self {
        Self::new(name, false)
    }

    fn new(name: &str, tracked: bool) -> Self {
        Self {
            id: GatewayId::new(name),
            tracked,
            should_fail: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Make subsequent sends fail (or succeed again).
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Sends observed so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentRecord> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl GatewayTransport for MockGateway {
    fn id(&self) -> GatewayId {
        self.id.clone()
    }

    async fn send(
        &self,
        destination: &InteropAddress,
        envelope: &[u8],
        attributes: &[Vec<u8>],
    ) -> AggregatorResult<Option<Hash>> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(AggregatorError::Transport {
                reason: format!("mock gateway {} offline", self.id),
            });
        }
        self.sent.lock().push(SentRecord {
            destination: destination.clone(),
            envelope: envelope.to_vec(),
            attributes: attributes.to_vec(),
        });
        if self.tracked {
            let mut tracking = [0u8; 32];
            tracking[..16].copy_from_slice(Uuid::new_v4().as_bytes());
            Ok(Some(tracking))
        } else {
            Ok(None)
        }
    }
}

/// How a [`MockReceiver`] answers the next invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverBehavior {
    /// Return the expected acknowledgement.
    Acknowledge,
    /// Return a wrong acknowledgement value.
    WrongAck,
    /// Fail the call outright.
    Fail,
}

/// One recorded invocation on a [`MockReceiver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedCall {
    /// Receiver the dispatch targeted.
    pub receiver: InteropAddress,
    /// Source chain of the message.
    pub source_chain: ChainRef,
    /// Original sender on the source chain.
    pub sender: InteropAddress,
    /// The unwrapped inner payload.
    pub payload: Vec<u8>,
    /// Attributes passed through unmodified.
    pub attributes: Vec<Vec<u8>>,
}

/// Mock destination receiver with scriptable behavior.
pub struct MockReceiver {
    behavior: Mutex<ReceiverBehavior>,
    calls: Mutex<Vec<ReceivedCall>>,
}

impl MockReceiver {
    /// A receiver that acknowledges everything.
    #[must_use]
    pub fn acknowledging() -> Self {
        Self {
            behavior: Mutex::new(ReceiverBehavior::Acknowledge),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Change how subsequent invocations are answered.
    pub fn set_behavior(&self, behavior: ReceiverBehavior) {
        *self.behavior.lock() = behavior;
    }

    /// Invocations observed so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ReceivedCall> {
        self.calls.lock().clone()
    }

    /// Number of invocations observed.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Default for MockReceiver {
    fn default() -> Self {
        Self::acknowledging()
    }
}

#[async_trait]
impl ReceiverDispatch for MockReceiver {
    async fn execute_message(
        &self,
        receiver: &InteropAddress,
        source_chain: &ChainRef,
        sender: &InteropAddress,
        payload: &[u8],
        attributes: &[Vec<u8>],
    ) -> AggregatorResult<ExecutionAck> {
        self.calls.lock().push(ReceivedCall {
            receiver: receiver.clone(),
            source_chain: source_chain.clone(),
            sender: sender.clone(),
            payload: payload.to_vec(),
            attributes: attributes.to_vec(),
        });
        match *self.behavior.lock() {
            ReceiverBehavior::Acknowledge => Ok(ExecutionAck::expected()),
            ReceiverBehavior::WrongAck => Ok(ExecutionAck([0u8; 4])),
            ReceiverBehavior::Fail => Err(AggregatorError::Downstream {
                reason: "mock receiver reverted".to_string(),
            }),
        }
    }
}
