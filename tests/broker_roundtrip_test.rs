//! Broker-backed pipeline tests.
//!
//! These require a local RabbitMQ with default guest credentials:
//!
//! ```bash
//! docker run --rm -p 5672:5672 rabbitmq:3
//! cargo test --test broker_roundtrip_test -- --ignored
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lapin::message::Delivery;
use lapin::options::BasicAckOptions;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use fleet_relay::{
    connect, ensure_topology, publish, run_consumer, BrokerConfig, MessageHandler, RelayError,
    RelayResult,
};

struct CollectAndAck {
    bodies: Arc<Mutex<Vec<Vec<u8>>>>,
}

#[async_trait]
impl MessageHandler for CollectAndAck {
    async fn handle(&self, delivery: Delivery) -> RelayResult<()> {
        self.bodies.lock().push(delivery.data.clone());
        delivery
            .ack(BasicAckOptions::default())
            .await
            .map_err(|e| RelayError::transport(e.to_string()))
    }
}

#[tokio::test]
#[ignore = "requires RabbitMQ running"]
async fn publish_then_consume_roundtrip() {
    let config = BrokerConfig::default();
    let (connection, channel) = connect(&config).await.unwrap();

    let queue_name = format!("test_roundtrip_{}", uuid::Uuid::new_v4());
    ensure_topology(&channel, &queue_name).await.unwrap();

    publish(&channel, &queue_name, br#"{"kind":"heartbeat"}"#, "guest")
        .await
        .unwrap();
    connection.close(200, "seed done").await.unwrap();

    let bodies = Arc::new(Mutex::new(Vec::new()));
    let cancel = CancellationToken::new();
    let consumer = {
        let config = config.clone();
        let queue_name = queue_name.clone();
        let handler: Arc<dyn MessageHandler> = Arc::new(CollectAndAck {
            bodies: Arc::clone(&bodies),
        });
        let cancel = cancel.clone();
        tokio::spawn(async move { run_consumer(&config, &queue_name, handler, cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(500)).await;
    cancel.cancel();
    consumer.await.unwrap().unwrap();

    let bodies = bodies.lock();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0], br#"{"kind":"heartbeat"}"#);
}

#[tokio::test]
#[ignore = "requires RabbitMQ running"]
async fn forged_identity_delivers_nothing_anywhere() {
    use fleet_relay::constants::dead_letter::DLX_QUEUE;
    use lapin::options::BasicGetOptions;

    let config = BrokerConfig::default();
    let (connection, channel) = connect(&config).await.unwrap();

    let queue_name = format!("test_forged_{}", uuid::Uuid::new_v4());
    ensure_topology(&channel, &queue_name).await.unwrap();

    let err = publish(&channel, &queue_name, b"forged", "somebody-else")
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::IdentityMismatch { .. }));

    // Rejected before delivery: neither the target queue nor the shared DLQ
    // holds the message.
    let (connection2, channel2) = connect(&config).await.unwrap();
    let target = channel2
        .basic_get(&queue_name, BasicGetOptions::default())
        .await
        .unwrap();
    assert!(target.is_none());
    let dlq = channel2
        .basic_get(DLX_QUEUE, BasicGetOptions::default())
        .await
        .unwrap();
    assert!(dlq.is_none());

    connection2.close(200, "test done").await.unwrap();
    drop(connection);
}
