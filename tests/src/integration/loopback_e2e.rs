//! # End-to-End Loopback Choreography
//!
//! Two aggregator instances bridged by in-process loopback gateways:
//! a message posted on one chain travels through every gateway leg and
//! executes on the other chain exactly once.

#[cfg(test)]
mod tests {
    use relay_aggregator::{
        AggregatorAdmin, AggregatorApi, AggregatorConfig, AggregatorError, AggregatorService,
        LoopbackGateway, MockReceiver, ReceiverBehavior,
    };
    use relay_bus::InMemoryEventBus;
    use relay_types::{ChainRef, GatewayId, InteropAddress, OperatorId};
    use std::sync::Arc;

    const GATEWAY_NAMES: [&str; 3] = ["axelar", "wormhole", "layerzero"];

    fn owner() -> OperatorId {
        OperatorId::new("relay-ops")
    }

    struct Instance {
        chain: ChainRef,
        address: InteropAddress,
        service: Arc<AggregatorService<MockReceiver>>,
        receiver: Arc<MockReceiver>,
    }

    fn instance(chain: &str, account: &str) -> Instance {
        let chain: ChainRef = chain.parse().unwrap();
        let receiver = Arc::new(MockReceiver::acknowledging());
        let service = Arc::new(AggregatorService::new(
            AggregatorConfig {
                local_chain: chain.clone(),
                local_account: account.to_string(),
                owner: owner(),
            },
            receiver.clone(),
            Arc::new(InMemoryEventBus::new()),
        ));
        let address = InteropAddress::new(chain.clone(), account).unwrap();
        Instance {
            chain,
            address,
            service,
            receiver,
        }
    }

    /// Bridge two instances with one loopback leg per gateway operator, in
    /// each direction, and bind their remote registries to each other.
    async fn bridge(a: &Instance, b: &Instance) {
        for name in GATEWAY_NAMES {
            let to_b = Arc::new(LoopbackGateway::new(
                GatewayId::new(name),
                a.chain.clone(),
                a.address.clone(),
                b.service.clone() as Arc<dyn AggregatorApi>,
            ));
            a.service.add_gateway(&owner(), to_b).await.unwrap();

            let to_a = Arc::new(LoopbackGateway::new(
                GatewayId::new(name),
                b.chain.clone(),
                b.address.clone(),
                a.service.clone() as Arc<dyn AggregatorApi>,
            ));
            b.service.add_gateway(&owner(), to_a).await.unwrap();
        }
        a.service.set_threshold(&owner(), 2).await.unwrap();
        b.service.set_threshold(&owner(), 2).await.unwrap();

        a.service
            .register_remote_aggregator(&owner(), b.chain.clone(), b.address.clone())
            .await
            .unwrap();
        b.service
            .register_remote_aggregator(&owner(), a.chain.clone(), a.address.clone())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_round_trip_between_two_chains() {
        let mainnet = instance("eip155:1", "0xmainnet-agg");
        let polygon = instance("eip155:137", "0xpolygon-agg");
        bridge(&mainnet, &polygon).await;

        mainnet
            .service
            .send_message(
                "0xalice",
                "eip155:137:0xvault".parse().unwrap(),
                b"deposit:100".to_vec(),
                vec![],
            )
            .await
            .unwrap();
        assert_eq!(polygon.receiver.call_count(), 1);
        assert_eq!(polygon.receiver.calls()[0].payload, b"deposit:100");
        assert_eq!(
            polygon.receiver.calls()[0].sender.to_string(),
            "eip155:1:0xalice"
        );
        assert_eq!(
            polygon.receiver.calls()[0].receiver.to_string(),
            "eip155:137:0xvault"
        );

        // And back the other way.
        polygon
            .service
            .send_message(
                "0xvault",
                "eip155:1:0xalice".parse().unwrap(),
                b"receipt:100".to_vec(),
                vec![],
            )
            .await
            .unwrap();
        assert_eq!(mainnet.receiver.call_count(), 1);
        assert_eq!(mainnet.receiver.calls()[0].payload, b"receipt:100");
    }

    #[tokio::test]
    async fn test_attributes_travel_unmodified() {
        let mainnet = instance("eip155:1", "0xmainnet-agg");
        let polygon = instance("eip155:137", "0xpolygon-agg");
        bridge(&mainnet, &polygon).await;

        let attributes = vec![b"min-gas:200000".to_vec(), b"priority:high".to_vec()];
        mainnet
            .service
            .send_message(
                "0xalice",
                "eip155:137:0xvault".parse().unwrap(),
                b"payload".to_vec(),
                attributes.clone(),
            )
            .await
            .unwrap();
        assert_eq!(polygon.receiver.calls()[0].attributes, attributes);
    }

    #[tokio::test]
    async fn test_paused_destination_fails_the_send() {
        let mainnet = instance("eip155:1", "0xmainnet-agg");
        let polygon = instance("eip155:137", "0xpolygon-agg");
        bridge(&mainnet, &polygon).await;
        polygon.service.pause(&owner()).await.unwrap();

        // Every loopback leg is rejected by the paused destination, so the
        // atomic fan-out fails on the first gateway.
        let err = mainnet
            .service
            .send_message(
                "0xalice",
                "eip155:137:0xvault".parse().unwrap(),
                b"held".to_vec(),
                vec![],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AggregatorError::GatewaySendFailed { .. }));
        assert_eq!(polygon.receiver.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_destination_execution_recovers_on_later_leg() {
        let mainnet = instance("eip155:1", "0xmainnet-agg");
        let polygon = instance("eip155:137", "0xpolygon-agg");
        bridge(&mainnet, &polygon).await;

        // All legs deliver while the receiver is down. Quorum is reached on
        // the second leg and retried on the third; both attempts fail and
        // roll back, but delivery itself succeeds so the send goes through.
        polygon.receiver.set_behavior(ReceiverBehavior::Fail);
        mainnet
            .service
            .send_message(
                "0xalice",
                "eip155:137:0xvault".parse().unwrap(),
                b"flaky".to_vec(),
                vec![],
            )
            .await
            .unwrap();
        assert_eq!(polygon.receiver.call_count(), 2);

        // Once the receiver recovers, any caller may poke the stuck message
        // by replaying the exact wire envelope (first send, so nonce 0).
        polygon.receiver.set_behavior(ReceiverBehavior::Acknowledge);
        let envelope = relay_types::Envelope {
            nonce: 0,
            sender: "eip155:1:0xalice".to_string(),
            receiver: "eip155:137:0xvault".to_string(),
            payload: b"flaky".to_vec(),
        }
        .encode();
        let outcome = polygon
            .service
            .execute_message(
                GatewayId::new("keeper"),
                mainnet.chain.clone(),
                mainnet.address.clone(),
                envelope,
                vec![],
            )
            .await
            .unwrap();
        assert!(outcome.executed);
        assert_eq!(polygon.receiver.call_count(), 3);
    }

    #[tokio::test]
    async fn test_third_chain_requires_its_own_registration() {
        let mainnet = instance("eip155:1", "0xmainnet-agg");
        let polygon = instance("eip155:137", "0xpolygon-agg");
        bridge(&mainnet, &polygon).await;

        let err = mainnet
            .service
            .send_message(
                "0xalice",
                "eip155:42161:0xarb-app".parse().unwrap(),
                b"lost".to_vec(),
                vec![],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AggregatorError::UnknownChain { .. }));
    }
}
