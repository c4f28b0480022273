//! Loopback Gateway Adapter
//!
//! Implements [`GatewayTransport`] by delivering the envelope straight into
//! another in-process aggregator's reception entrypoint. In production a
//! transport would hand the envelope to an external bridge network; the
//! loopback stands in for one whole delivery leg, which makes it possible
//! to wire two aggregator instances together and exercise the full
//! source-to-destination path in one process.

use crate::error::{AggregatorError, AggregatorResult};
use crate::ports::inbound::AggregatorApi;
use crate::ports::outbound::GatewayTransport;
use async_trait::async_trait;
use relay_types::{ChainRef, GatewayId, Hash, InteropAddress};
use sha3::{Digest, Keccak256};
use std::sync::Arc;
use tracing::debug;

/// A gateway whose delivery leg is a direct call into the destination
/// aggregator.
///
/// The destination validates `source_aggregator` against its remote
/// registry, so the loopback must be constructed with the identity the
/// source-side aggregator presents on the wire.
pub struct LoopbackGateway {
    id: GatewayId,
    source_chain: ChainRef,
    source_aggregator: InteropAddress,
    destination: Arc<dyn AggregatorApi>,
}

impl LoopbackGateway {
    /// Create a loopback delivery leg into `destination`.
    pub fn new(
        id: GatewayId,
        source_chain: ChainRef,
        source_aggregator: InteropAddress,
        destination: Arc<dyn AggregatorApi>,
    ) -> Self {
        Self {
            id,
            source_chain,
            source_aggregator,
            destination,
        }
    }
}

/// Tracking id derived from the gateway identity and the envelope bytes.
fn tracking_id(gateway: &GatewayId, envelope: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(gateway.0.as_bytes());
    hasher.update(envelope);
    hasher.finalize().into()
}

#[async_trait]
impl GatewayTransport for LoopbackGateway {
    fn id(&self) -> GatewayId {
        self.id.clone()
    }

    async fn send(
        &self,
        destination: &InteropAddress,
        envelope: &[u8],
        attributes: &[Vec<u8>],
    ) -> AggregatorResult<Option<Hash>> {
        debug!(gateway = %self.id, destination = %destination, "Loopback delivery");
        self.destination
            .execute_message(
                self.id.clone(),
                self.source_chain.clone(),
                self.source_aggregator.clone(),
                envelope.to_vec(),
                attributes.to_vec(),
            )
            .await
            .map_err(|err| AggregatorError::Transport {
                reason: format!("loopback delivery rejected: {err}"),
            })?;
        Ok(Some(tracking_id(&self.id, envelope)))
    }
}
