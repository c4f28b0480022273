//! Cross-crate integration tests.

pub mod admin_flows;
pub mod loopback_e2e;
pub mod two_phase;

#[cfg(test)]
pub(crate) mod fixtures {
    use relay_aggregator::{
        AggregatorAdmin, AggregatorConfig, AggregatorService, GatewayTransport, MockGateway,
        MockReceiver,
    };
    use relay_bus::InMemoryEventBus;
    use relay_types::{ChainRef, Envelope, GatewayId, InteropAddress, OperatorId};
    use std::sync::Arc;

    pub const OWNER: &str = "relay-ops";

    pub fn owner() -> OperatorId {
        OperatorId::new(OWNER)
    }

    pub fn source_chain() -> ChainRef {
        "eip155:1".parse().unwrap()
    }

    pub fn source_aggregator() -> InteropAddress {
        "eip155:1:0xsrc-agg".parse().unwrap()
    }

    /// A destination-side deployment under test, with handles on its mocks.
    pub struct Deployment {
        pub service: Arc<AggregatorService<MockReceiver>>,
        pub receiver: Arc<MockReceiver>,
        pub gateways: Vec<Arc<MockGateway>>,
        pub bus: Arc<InMemoryEventBus>,
    }

    /// Destination aggregator on eip155:137 with `m` gateways, threshold `n`,
    /// trusting [`source_aggregator`] for messages from eip155:1.
    pub async fn deployment(m: usize, n: usize) -> Deployment {
        let receiver = Arc::new(MockReceiver::acknowledging());
        let bus = Arc::new(InMemoryEventBus::new());
        let service = Arc::new(AggregatorService::new(
            AggregatorConfig {
                local_chain: "eip155:137".parse().unwrap(),
                local_account: "0xdest-agg".to_string(),
                owner: owner(),
            },
            receiver.clone(),
            bus.clone(),
        ));

        let gateways: Vec<_> = (0..m)
            .map(|i| Arc::new(MockGateway::tracked(&format!("gateway-{i}"))))
            .collect();
        for gateway in &gateways {
            service
                .add_gateway(&owner(), gateway.clone() as Arc<dyn GatewayTransport>)
                .await
                .unwrap();
        }
        service.set_threshold(&owner(), n).await.unwrap();
        service
            .register_remote_aggregator(&owner(), source_chain(), source_aggregator())
            .await
            .unwrap();

        Deployment {
            service,
            receiver,
            gateways,
            bus,
        }
    }

    pub fn gateway(i: usize) -> GatewayId {
        GatewayId::new(format!("gateway-{i}"))
    }

    /// Wire payload as delivered by any gateway: the envelope a source-side
    /// instance would have encoded for receiver 0xapp on eip155:137.
    pub fn wire_payload(nonce: u64, inner: &[u8]) -> Vec<u8> {
        Envelope {
            nonce,
            sender: "eip155:1:0xuser".to_string(),
            receiver: "eip155:137:0xapp".to_string(),
            payload: inner.to_vec(),
        }
        .encode()
    }
}
