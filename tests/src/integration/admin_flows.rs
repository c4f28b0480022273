//! # Administrative Flows
//!
//! Gateway set management, threshold safety, the write-once remote
//! registry, operator authorization, and the pause circuit breaker.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{
        deployment, gateway, owner, source_aggregator, source_chain, wire_payload,
    };
    use relay_aggregator::{
        AggregatorAdmin, AggregatorApi, AggregatorError, GatewayTransport, MockGateway,
    };
    use relay_bus::{EventFilter, EventTopic, RelayEvent};
    use relay_types::OperatorId;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_gateway_set_mutations() {
        let dep = deployment(3, 2).await;
        assert_eq!(dep.service.active_gateways().len(), 3);

        // Duplicate registration is rejected.
        let dup = Arc::new(MockGateway::tracked("gateway-0"));
        let err = dep
            .service
            .add_gateway(&owner(), dup as Arc<dyn GatewayTransport>)
            .await
            .unwrap_err();
        assert!(matches!(err, AggregatorError::GatewayAlreadyRegistered { .. }));

        // One removal keeps M >= N; a second would break it.
        dep.service.remove_gateway(&owner(), &gateway(2)).await.unwrap();
        let err = dep
            .service
            .remove_gateway(&owner(), &gateway(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AggregatorError::ThresholdViolation { .. }));
        assert_eq!(dep.service.active_gateways().len(), 2);
    }

    #[tokio::test]
    async fn test_threshold_bounds_enforced() {
        let dep = deployment(3, 2).await;
        assert!(matches!(
            dep.service.set_threshold(&owner(), 0).await.unwrap_err(),
            AggregatorError::InvalidThreshold { .. }
        ));
        assert!(matches!(
            dep.service.set_threshold(&owner(), 4).await.unwrap_err(),
            AggregatorError::InvalidThreshold { .. }
        ));
        dep.service.set_threshold(&owner(), 3).await.unwrap();
        assert_eq!(dep.service.threshold(), 3);
    }

    #[tokio::test]
    async fn test_remote_registry_is_write_once() {
        let dep = deployment(3, 2).await;
        assert_eq!(
            dep.service.remote_aggregator(&source_chain()).unwrap(),
            source_aggregator()
        );

        // Rebinding the same chain is rejected, even by the owner.
        let err = dep
            .service
            .register_remote_aggregator(
                &owner(),
                source_chain(),
                "eip155:1:0xhijacked".parse().unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AggregatorError::RemoteAlreadyRegistered { .. }));
        assert_eq!(
            dep.service.remote_aggregator(&source_chain()).unwrap(),
            source_aggregator()
        );

        // A different chain binds fine.
        dep.service
            .register_remote_aggregator(
                &owner(),
                "eip155:10".parse().unwrap(),
                "eip155:10:0xoptimism-agg".parse().unwrap(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_every_admin_operation_requires_owner() {
        let dep = deployment(3, 2).await;
        let stranger = OperatorId::new("stranger");

        let extra = Arc::new(MockGateway::tracked("gateway-9"));
        assert!(matches!(
            dep.service
                .add_gateway(&stranger, extra as Arc<dyn GatewayTransport>)
                .await
                .unwrap_err(),
            AggregatorError::UnauthorizedOperator { .. }
        ));
        assert!(matches!(
            dep.service
                .remove_gateway(&stranger, &gateway(0))
                .await
                .unwrap_err(),
            AggregatorError::UnauthorizedOperator { .. }
        ));
        assert!(matches!(
            dep.service.set_threshold(&stranger, 1).await.unwrap_err(),
            AggregatorError::UnauthorizedOperator { .. }
        ));
        assert!(matches!(
            dep.service
                .register_remote_aggregator(
                    &stranger,
                    "eip155:10".parse().unwrap(),
                    "eip155:10:0xagg".parse().unwrap(),
                )
                .await
                .unwrap_err(),
            AggregatorError::UnauthorizedOperator { .. }
        ));
        assert!(matches!(
            dep.service.pause(&stranger).await.unwrap_err(),
            AggregatorError::UnauthorizedOperator { .. }
        ));

        // Nothing changed.
        assert_eq!(dep.service.active_gateways().len(), 3);
        assert_eq!(dep.service.threshold(), 2);
        assert!(!dep.service.is_paused());
    }

    #[tokio::test]
    async fn test_pause_blocks_message_paths() {
        let dep = deployment(3, 2).await;
        dep.service.pause(&owner()).await.unwrap();

        let err = dep
            .service
            .execute_message(
                gateway(0),
                source_chain(),
                source_aggregator(),
                wire_payload(0, b"blocked"),
                vec![],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AggregatorError::SystemPaused));

        // Admin operations keep working while paused.
        dep.service.set_threshold(&owner(), 3).await.unwrap();

        dep.service.unpause(&owner()).await.unwrap();
        let outcome = dep
            .service
            .execute_message(
                gateway(0),
                source_chain(),
                source_aggregator(),
                wire_payload(0, b"unblocked"),
                vec![],
            )
            .await
            .unwrap();
        assert!(outcome.newly_recorded);
    }

    #[tokio::test]
    async fn test_admin_events_published() {
        let dep = deployment(3, 2).await;
        let mut sub = dep.bus.subscribe(EventFilter::topics(vec![EventTopic::Admin]));

        dep.service.set_threshold(&owner(), 3).await.unwrap();
        dep.service.pause(&owner()).await.unwrap();
        dep.service.unpause(&owner()).await.unwrap();

        let mut events = Vec::new();
        for _ in 0..3 {
            events.push(
                timeout(Duration::from_secs(1), sub.recv())
                    .await
                    .expect("event bus timed out")
                    .expect("bus closed"),
            );
        }
        assert!(matches!(events[0], RelayEvent::ThresholdUpdated { threshold: 3 }));
        assert!(matches!(events[1], RelayEvent::Paused));
        assert!(matches!(events[2], RelayEvent::Unpaused));
    }
}
