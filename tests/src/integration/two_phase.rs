//! # Two-Phase Send Lifecycle
//!
//! Source-side outbox flows: recording intent with `create_message`,
//! dispatching it with `forward_message`, idempotent replays, and rollback
//! when the fan-out fails mid-flight.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{deployment, owner, source_aggregator};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use relay_aggregator::{
        AggregatorAdmin, AggregatorApi, AggregatorError, AggregatorResult, AggregatorService,
        GatewayTransport, MockReceiver,
    };
    use relay_bus::{EventFilter, EventTopic, RelayEvent};
    use relay_types::{GatewayId, Hash, InteropAddress};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    // The fixture's remote binding for eip155:1 doubles as the send target:
    // the service on eip155:137 can post messages toward eip155:1.
    fn destination() -> InteropAddress {
        "eip155:1:0xapp".parse().unwrap()
    }

    #[tokio::test]
    async fn test_create_then_forward_dispatches_once() {
        let dep = deployment(3, 2).await;
        let mut sub = dep
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Outbound]));

        let key = dep
            .service
            .create_message("0xsender", destination(), b"deferred".to_vec(), vec![])
            .await
            .unwrap();
        // Intent only; no gateway saw anything yet.
        for gateway in &dep.gateways {
            assert!(gateway.sent().is_empty());
        }

        let receipt = dep.service.forward_message(key).await.unwrap();
        assert!(receipt.outbox_id.is_some());
        for gateway in &dep.gateways {
            assert_eq!(gateway.sent().len(), 1);
            assert_eq!(gateway.sent()[0].destination, source_aggregator());
        }

        let event = timeout(Duration::from_secs(1), sub.recv())
            .await
            .expect("event bus timed out")
            .expect("bus closed");
        assert!(matches!(event, RelayEvent::MessagePosted { .. }));
    }

    #[tokio::test]
    async fn test_create_is_idempotent_and_forward_replays_receipt() {
        let dep = deployment(3, 2).await;

        let key = dep
            .service
            .create_message("0xsender", destination(), b"idem".to_vec(), vec![])
            .await
            .unwrap();
        let same = dep
            .service
            .create_message("0xsender", destination(), b"idem".to_vec(), vec![])
            .await
            .unwrap();
        assert_eq!(key, same);

        let first = dep.service.forward_message(key).await.unwrap();
        let replay = dep.service.forward_message(key).await.unwrap();
        assert_eq!(first, replay);
        // Exactly one fan-out happened.
        assert_eq!(dep.gateways[0].sent().len(), 1);
    }

    #[tokio::test]
    async fn test_forward_failure_leaves_entry_retryable() {
        let dep = deployment(3, 2).await;
        let key = dep
            .service
            .create_message("0xsender", destination(), b"retry".to_vec(), vec![])
            .await
            .unwrap();

        dep.gateways[1].set_should_fail(true);
        let err = dep.service.forward_message(key).await.unwrap_err();
        assert!(matches!(err, AggregatorError::GatewaySendFailed { .. }));

        dep.gateways[1].set_should_fail(false);
        let receipt = dep.service.forward_message(key).await.unwrap();
        assert!(receipt.outbox_id.is_some());
    }

    /// Transport that re-enters `forward_message` for a chosen key while its
    /// own fan-out call is still in flight, recording what the nested call
    /// observed.
    struct ReentrantGateway {
        id: GatewayId,
        service: Mutex<Option<Arc<AggregatorService<MockReceiver>>>>,
        key: Mutex<Option<Hash>>,
        nested: Mutex<Option<AggregatorResult<()>>>,
    }

    impl ReentrantGateway {
        fn new(name: &str) -> Self {
            Self {
                id: GatewayId::new(name),
                service: Mutex::new(None),
                key: Mutex::new(None),
                nested: Mutex::new(None),
            }
        }

        fn arm(&self, service: Arc<AggregatorService<MockReceiver>>, key: Hash) {
            *self.service.lock() = Some(service);
            *self.key.lock() = Some(key);
        }
    }

    #[async_trait]
    impl GatewayTransport for ReentrantGateway {
        fn id(&self) -> GatewayId {
            self.id.clone()
        }

        async fn send(
            &self,
            _destination: &InteropAddress,
            _envelope: &[u8],
            _attributes: &[Vec<u8>],
        ) -> AggregatorResult<Option<Hash>> {
            let service = self.service.lock().clone();
            let key = *self.key.lock();
            if let (Some(service), Some(key)) = (service, key) {
                let outcome = service.forward_message(key).await.map(|_| ());
                *self.nested.lock() = Some(outcome);
            }
            Ok(Some([0x5a; 32]))
        }
    }

    #[tokio::test]
    async fn test_forward_rejects_concurrent_replay_mid_dispatch() {
        let dep = deployment(1, 1).await;
        let gateway = Arc::new(ReentrantGateway::new("reentrant"));
        dep.service
            .add_gateway(&owner(), gateway.clone() as Arc<dyn GatewayTransport>)
            .await
            .unwrap();

        let key = dep
            .service
            .create_message("0xsender", destination(), b"mid-flight".to_vec(), vec![])
            .await
            .unwrap();
        gateway.arm(dep.service.clone(), key);

        let receipt = dep.service.forward_message(key).await.unwrap();
        assert!(receipt.outbox_id.is_some());

        // The nested call saw the in-flight claim rather than a provisional
        // receipt with a cleared outbox id.
        assert!(matches!(
            gateway.nested.lock().take(),
            Some(Err(AggregatorError::ForwardInProgress { .. }))
        ));

        // Once settled, replays return the real receipt.
        let replay = dep.service.forward_message(key).await.unwrap();
        assert_eq!(replay, receipt);
    }

    #[tokio::test]
    async fn test_forward_unknown_key_rejected() {
        let dep = deployment(3, 2).await;
        assert!(matches!(
            dep.service.forward_message([7u8; 32]).await.unwrap_err(),
            AggregatorError::OutboxEntryNotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_two_phase_blocked_while_paused() {
        let dep = deployment(3, 2).await;
        let key = dep
            .service
            .create_message("0xsender", destination(), b"held".to_vec(), vec![])
            .await
            .unwrap();

        dep.service.pause(&owner()).await.unwrap();
        assert!(matches!(
            dep.service
                .create_message("0xsender", destination(), b"new".to_vec(), vec![])
                .await
                .unwrap_err(),
            AggregatorError::SystemPaused
        ));
        assert!(matches!(
            dep.service.forward_message(key).await.unwrap_err(),
            AggregatorError::SystemPaused
        ));

        // The entry survives the pause and forwards after resume.
        dep.service.unpause(&owner()).await.unwrap();
        dep.service.forward_message(key).await.unwrap();
    }

    #[tokio::test]
    async fn test_distinct_cargo_yields_distinct_keys_and_nonces() {
        let dep = deployment(3, 2).await;
        let first = dep
            .service
            .create_message("0xsender", destination(), b"one".to_vec(), vec![])
            .await
            .unwrap();
        let second = dep
            .service
            .create_message("0xsender", destination(), b"two".to_vec(), vec![])
            .await
            .unwrap();
        assert_ne!(first, second);

        let r1 = dep.service.forward_message(first).await.unwrap();
        let r2 = dep.service.forward_message(second).await.unwrap();
        assert_ne!(r1.nonce, r2.nonce);
    }
}
