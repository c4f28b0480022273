//! # Aggregator Service - Core business logic
//!
//! Implements both inbound ports:
//! - [`AggregatorApi`]: outbound fan-out and destination-side reception
//! - [`AggregatorAdmin`]: owner-gated configuration and the pause switch
//!
//! It depends on two outbound ports:
//! - [`GatewayTransport`]: one per active gateway, performs the actual
//!   cross-chain delivery
//! - [`ReceiverDispatch`]: invokes the destination receiver once quorum is
//!   reached
//!
//! ## Thread Safety
//!
//! The service is shared across async tasks via `Arc`. All state lives
//! behind a single `parking_lot::RwLock`; confirmations arriving from
//! different gateways in arbitrary order serialize on that lock, which
//! keeps the final state a function of the *set* of confirming gateways
//! only. The lock is never held across an outbound `await`.
//!
//! ## Reentrancy
//!
//! `executed` is committed under the lock strictly before the downstream
//! receiver is invoked, and reset only on an observed failure of that
//! specific call. A reentrant callback into `execute_message` therefore
//! sees the message as executed and cannot trigger a second execution.

use crate::domain::{
    invariant_no_premature_execution, invariant_threshold_reachable, outbox_key, OutboxEntry,
    TrackerStatus,
};
use crate::error::{AggregatorError, AggregatorResult};
use crate::metrics;
use crate::ports::inbound::{
    AggregatorAdmin, AggregatorApi, ExecutionOutcome, ExecutionReport, SendReceipt,
};
use crate::ports::outbound::{GatewayTransport, ReceiverDispatch};
use crate::state::AggregatorState;
use async_trait::async_trait;
use parking_lot::RwLock;
use relay_bus::{EventPublisher, RelayEvent};
use relay_types::{
    hash_hex, message_id, outbox_id, ChainRef, Envelope, GatewayId, Hash, InteropAddress,
    Message, OperatorId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Static configuration of one aggregator instance.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// The chain this instance serves.
    pub local_chain: ChainRef,
    /// This aggregator's own account on the local chain. Remote peers
    /// register this identity and validate it on reception.
    pub local_account: String,
    /// The only operator allowed to perform administrative mutations.
    pub owner: OperatorId,
}

impl AggregatorConfig {
    /// This aggregator's chain-qualified identity.
    pub fn local_address(&self) -> AggregatorResult<InteropAddress> {
        Ok(InteropAddress::new(
            self.local_chain.clone(),
            self.local_account.clone(),
        )?)
    }
}

/// The N-of-M aggregator service.
///
/// One instance per chain. A message is sent by fanning the wire envelope
/// out through every active gateway; on the destination instance each
/// gateway's delivery lands in [`AggregatorApi::execute_message`], which
/// counts distinct confirmations and invokes the receiver exactly once per
/// reached quorum.
pub struct AggregatorService<D>
where
    D: ReceiverDispatch,
{
    config: AggregatorConfig,
    state: RwLock<AggregatorState>,
    /// Transport handles mirroring the domain gateway set.
    transports: RwLock<HashMap<GatewayId, Arc<dyn GatewayTransport>>>,
    dispatch: Arc<D>,
    bus: Arc<dyn EventPublisher>,
}

impl<D> AggregatorService<D>
where
    D: ReceiverDispatch,
{
    /// Create a new aggregator service.
    pub fn new(config: AggregatorConfig, dispatch: Arc<D>, bus: Arc<dyn EventPublisher>) -> Self {
        Self {
            config,
            state: RwLock::new(AggregatorState::new()),
            transports: RwLock::new(HashMap::new()),
            dispatch,
            bus,
        }
    }

    /// The instance configuration.
    #[must_use]
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    fn authorize(&self, operator: &OperatorId) -> AggregatorResult<()> {
        if operator != &self.config.owner {
            return Err(AggregatorError::UnauthorizedOperator {
                operator: operator.clone(),
            });
        }
        Ok(())
    }

    async fn publish(&self, event: RelayEvent) {
        self.bus.publish(event).await;
    }

    /// Snapshot the transports for the current active set, in stable order.
    fn transport_snapshot(&self) -> AggregatorResult<Vec<Arc<dyn GatewayTransport>>> {
        let members = self.state.read().gateways.members();
        let transports = self.transports.read();
        members
            .iter()
            .map(|id| {
                transports
                    .get(id)
                    .cloned()
                    .ok_or_else(|| AggregatorError::Transport {
                        reason: format!("no transport bound for gateway {id}"),
                    })
            })
            .collect()
    }

    /// Fan one envelope out to every active gateway.
    ///
    /// Atomic at the protocol level: the first transport error aborts the
    /// call and nothing is reported as posted.
    async fn fan_out(
        &self,
        remote: &InteropAddress,
        envelope: &[u8],
        attributes: &[Vec<u8>],
    ) -> AggregatorResult<Vec<(GatewayId, Hash)>> {
        let transports = self.transport_snapshot()?;
        let mut tracked = Vec::new();
        for transport in transports {
            let gateway = transport.id();
            match transport.send(remote, envelope, attributes).await {
                Ok(Some(tracking)) => tracked.push((gateway, tracking)),
                Ok(None) => {}
                Err(err) => {
                    warn!(gateway = %gateway, error = %err, "Gateway send failed, aborting fan-out");
                    return Err(AggregatorError::GatewaySendFailed {
                        gateway,
                        reason: err.to_string(),
                    });
                }
            }
        }
        Ok(tracked)
    }

    /// Build, dispatch, and announce one envelope. Shared by the one-shot
    /// and two-phase send paths.
    async fn dispatch_envelope(
        &self,
        sender: &InteropAddress,
        destination: &InteropAddress,
        payload: &[u8],
        attributes: &[Vec<u8>],
        nonce: u64,
    ) -> AggregatorResult<SendReceipt> {
        let remote = self
            .state
            .read()
            .remotes
            .get(&destination.chain)?
            .clone();

        let envelope = Envelope {
            nonce,
            sender: sender.to_string(),
            receiver: destination.to_string(),
            payload: payload.to_vec(),
        }
        .encode();

        let tracked = self.fan_out(&remote, &envelope, attributes).await?;
        let outbox_id = (!tracked.is_empty()).then(|| outbox_id(&tracked));

        info!(
            destination = %destination,
            nonce,
            gateways = self.state.read().gateways.len(),
            tracked = tracked.len(),
            "Message posted"
        );
        metrics::inc_messages_posted();
        self.publish(RelayEvent::MessagePosted {
            outbox_id,
            message: Message {
                source: sender.clone(),
                destination: destination.clone(),
                payload: payload.to_vec(),
                attributes: attributes.to_vec(),
            },
        })
        .await;

        Ok(SendReceipt { outbox_id, nonce })
    }
}

#[async_trait]
impl<D> AggregatorApi for AggregatorService<D>
where
    D: ReceiverDispatch,
{
    async fn send_message(
        &self,
        sender_account: &str,
        destination: InteropAddress,
        payload: Vec<u8>,
        attributes: Vec<Vec<u8>>,
    ) -> AggregatorResult<SendReceipt> {
        let sender = InteropAddress::new(self.config.local_chain.clone(), sender_account)?;

        let nonce = {
            let mut st = self.state.write();
            if st.paused {
                return Err(AggregatorError::SystemPaused);
            }
            st.remotes.get(&destination.chain)?;
            st.assign_nonce()
        };

        self.dispatch_envelope(&sender, &destination, &payload, &attributes, nonce)
            .await
    }

    async fn create_message(
        &self,
        sender_account: &str,
        destination: InteropAddress,
        payload: Vec<u8>,
        attributes: Vec<Vec<u8>>,
    ) -> AggregatorResult<Hash> {
        let sender = InteropAddress::new(self.config.local_chain.clone(), sender_account)?;
        let key = outbox_key(&sender, &destination, &payload, &attributes);

        let mut st = self.state.write();
        if st.paused {
            return Err(AggregatorError::SystemPaused);
        }
        st.remotes.get(&destination.chain)?;

        if st.outbox.contains_key(&key) {
            debug!(outbox_key = %hash_hex(&key), "Outbox entry already exists, no-op");
            return Ok(key);
        }

        let nonce = st.assign_nonce();
        st.outbox.insert(
            key,
            OutboxEntry::created(sender, destination, payload, attributes, nonce),
        );
        debug!(outbox_key = %hash_hex(&key), nonce, "Outbox entry created");
        Ok(key)
    }

    async fn forward_message(&self, outbox_key: Hash) -> AggregatorResult<SendReceipt> {
        // Claim the entry before dispatching: Sent replays its receipt, an
        // in-flight claim is rejected, and a failed fan-out rolls back to
        // Created so the intent stays forwardable.
        let entry = {
            let mut st = self.state.write();
            if st.paused {
                return Err(AggregatorError::SystemPaused);
            }
            let entry = st.outbox.get_mut(&outbox_key).ok_or(
                AggregatorError::OutboxEntryNotFound { outbox_key },
            )?;
            if entry.is_sent() {
                debug!(outbox_key = %hash_hex(&outbox_key), "Outbox entry already sent, no-op");
                return Ok(SendReceipt {
                    outbox_id: entry.outbox_id,
                    nonce: entry.nonce,
                });
            }
            if entry.is_in_flight() {
                return Err(AggregatorError::ForwardInProgress { outbox_key });
            }
            entry.mark_sending();
            entry.clone()
        };

        let receipt = self
            .dispatch_envelope(
                &entry.sender,
                &entry.destination,
                &entry.payload,
                &entry.attributes,
                entry.nonce,
            )
            .await;

        let mut st = self.state.write();
        if let Some(stored) = st.outbox.get_mut(&outbox_key) {
            match &receipt {
                Ok(receipt) => stored.mark_sent(receipt.outbox_id),
                Err(_) => stored.reset_created(),
            }
        }
        receipt
    }

    async fn execute_message(
        &self,
        caller: GatewayId,
        source_chain: ChainRef,
        sender: InteropAddress,
        payload: Vec<u8>,
        attributes: Vec<Vec<u8>>,
    ) -> AggregatorResult<ExecutionOutcome> {
        // Decode before touching state so malformed bytes reject cleanly.
        let envelope = Envelope::decode(&payload)?;
        let receiver: InteropAddress = envelope.receiver.parse()?;
        let original_sender: InteropAddress = envelope.sender.parse()?;

        let id = message_id(&source_chain, &sender, &payload, &attributes);

        let mut received_event = None;
        let (newly_recorded, confirmations, attempt) = {
            let mut st = self.state.write();
            if st.paused {
                return Err(AggregatorError::SystemPaused);
            }
            let expected = st.remotes.get(&source_chain)?.clone();
            if expected != sender {
                return Err(AggregatorError::InvalidCrosschainSender {
                    expected,
                    got: sender,
                });
            }

            let is_gateway = st.gateways.contains(&caller);
            let quorum = st.gateways.clone();
            // Trackers are permanent once created; only recognized gateways
            // may bring one into existence.
            let tracker = if is_gateway {
                st.trackers.entry(id).or_default()
            } else {
                match st.trackers.get_mut(&id) {
                    Some(tracker) => tracker,
                    None => {
                        return Ok(ExecutionOutcome {
                            message_id: id,
                            newly_recorded: false,
                            confirmations: 0,
                            executed: false,
                            report: ExecutionReport::NotAttempted,
                        })
                    }
                }
            };

            let newly_recorded = is_gateway && tracker.confirm(caller.clone());
            if newly_recorded {
                debug!(
                    message_id = %hash_hex(&id),
                    gateway = %caller,
                    confirmations = tracker.count_received(),
                    "Gateway confirmation recorded"
                );
                metrics::inc_confirmations();
                received_event = Some(RelayEvent::MessageReceived {
                    message_id: id,
                    gateway: caller.clone(),
                });
            }

            let confirmations = tracker.count_received();
            let attempt = if tracker.executed() {
                if !is_gateway {
                    return Err(AggregatorError::AlreadyExecuted { message_id: id });
                }
                // Late confirmation from a recognized gateway: durably
                // recorded above, otherwise a silent no-op.
                false
            } else if quorum.quorum_met(confirmations) && (newly_recorded || !is_gateway) {
                // Only a net-new confirmation or an outside retry may
                // trigger execution; a gateway repeating an already-counted
                // report is a no-op. Effects before interaction: commit
                // under the lock, call out after releasing it.
                tracker.mark_executed();
                debug_assert!(invariant_no_premature_execution(tracker, quorum.threshold()));
                true
            } else {
                false
            };

            (newly_recorded, confirmations, attempt)
        };

        if let Some(event) = received_event {
            self.publish(event).await;
        }

        if !attempt {
            let executed = matches!(self.state.read().tracker_status(&id), TrackerStatus::Executed);
            return Ok(ExecutionOutcome {
                message_id: id,
                newly_recorded,
                confirmations,
                executed,
                report: ExecutionReport::NotAttempted,
            });
        }

        let succeeded = match self
            .dispatch
            .execute_message(
                &receiver,
                &source_chain,
                &original_sender,
                &envelope.payload,
                &attributes,
            )
            .await
        {
            Ok(ack) if ack.is_expected() => true,
            Ok(_) => {
                warn!(message_id = %hash_hex(&id), "Receiver returned wrong acknowledgement");
                false
            }
            Err(err) => {
                warn!(message_id = %hash_hex(&id), error = %err, "Receiver execution failed");
                false
            }
        };

        if succeeded {
            info!(message_id = %hash_hex(&id), confirmations, "Message executed");
            metrics::inc_executions();
            self.publish(RelayEvent::ExecutionSuccess { message_id: id })
                .await;
        } else {
            // Roll back to a retryable state; confirmations are untouched
            // and the reporting gateway's own call still succeeds.
            {
                let mut st = self.state.write();
                if let Some(tracker) = st.trackers.get_mut(&id) {
                    tracker.reset_executed();
                }
            }
            metrics::inc_execution_failures();
            self.publish(RelayEvent::ExecutionFailed { message_id: id })
                .await;
        }

        Ok(ExecutionOutcome {
            message_id: id,
            newly_recorded,
            confirmations,
            executed: succeeded,
            report: if succeeded {
                ExecutionReport::Succeeded
            } else {
                ExecutionReport::Failed
            },
        })
    }

    fn tracker_status(&self, message_id: &Hash) -> TrackerStatus {
        self.state.read().tracker_status(message_id)
    }

    fn active_gateways(&self) -> Vec<GatewayId> {
        self.state.read().gateways.members()
    }

    fn threshold(&self) -> usize {
        self.state.read().gateways.threshold()
    }

    fn remote_aggregator(&self, chain: &ChainRef) -> AggregatorResult<InteropAddress> {
        Ok(self.state.read().remotes.get(chain)?.clone())
    }

    fn is_paused(&self) -> bool {
        self.state.read().paused
    }
}

#[async_trait]
impl<D> AggregatorAdmin for AggregatorService<D>
where
    D: ReceiverDispatch,
{
    async fn add_gateway(
        &self,
        operator: &OperatorId,
        transport: Arc<dyn GatewayTransport>,
    ) -> AggregatorResult<()> {
        self.authorize(operator)?;
        let gateway = transport.id();
        {
            let mut st = self.state.write();
            st.gateways.add(gateway.clone())?;
            self.transports.write().insert(gateway.clone(), transport);
            metrics::set_active_gateways(st.gateways.len());
            debug_assert!(invariant_threshold_reachable(&st.gateways));
        }
        info!(gateway = %gateway, "Gateway added");
        self.publish(RelayEvent::GatewayAdded { gateway }).await;
        Ok(())
    }

    async fn remove_gateway(
        &self,
        operator: &OperatorId,
        gateway: &GatewayId,
    ) -> AggregatorResult<()> {
        self.authorize(operator)?;
        {
            let mut st = self.state.write();
            st.gateways.remove(gateway)?;
            self.transports.write().remove(gateway);
            metrics::set_active_gateways(st.gateways.len());
            debug_assert!(invariant_threshold_reachable(&st.gateways));
        }
        info!(gateway = %gateway, "Gateway removed");
        self.publish(RelayEvent::GatewayRemoved {
            gateway: gateway.clone(),
        })
        .await;
        Ok(())
    }

    async fn set_threshold(
        &self,
        operator: &OperatorId,
        threshold: usize,
    ) -> AggregatorResult<()> {
        self.authorize(operator)?;
        {
            let mut st = self.state.write();
            st.gateways.set_threshold(threshold)?;
            metrics::set_threshold(threshold);
            // Raising N does not retroactively invalidate executions that
            // met the old quorum, so only the set invariant is asserted.
            debug_assert!(invariant_threshold_reachable(&st.gateways));
        }
        info!(threshold, "Threshold updated");
        self.publish(RelayEvent::ThresholdUpdated { threshold }).await;
        Ok(())
    }

    async fn register_remote_aggregator(
        &self,
        operator: &OperatorId,
        chain: ChainRef,
        aggregator: InteropAddress,
    ) -> AggregatorResult<()> {
        self.authorize(operator)?;
        self.state
            .write()
            .remotes
            .register(chain.clone(), aggregator.clone())?;
        info!(chain = %chain, aggregator = %aggregator, "Remote aggregator registered");
        self.publish(RelayEvent::RemoteRegistered { chain, aggregator })
            .await;
        Ok(())
    }

    async fn pause(&self, operator: &OperatorId) -> AggregatorResult<()> {
        self.authorize(operator)?;
        {
            let mut st = self.state.write();
            if st.paused {
                return Err(AggregatorError::SystemPaused);
            }
            st.paused = true;
        }
        warn!("Aggregator paused");
        self.publish(RelayEvent::Paused).await;
        Ok(())
    }

    async fn unpause(&self, operator: &OperatorId) -> AggregatorResult<()> {
        self.authorize(operator)?;
        {
            let mut st = self.state.write();
            if !st.paused {
                return Err(AggregatorError::NotPaused);
            }
            st.paused = false;
        }
        info!("Aggregator unpaused");
        self.publish(RelayEvent::Unpaused).await;
        Ok(())
    }
}
