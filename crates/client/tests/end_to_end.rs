//! Client against a live manager endpoint
//!
//! Starts a `ManagerServer` backed by a `ValueQueue` on a temp socket and
//! drives it through the public client API.

use std::sync::Arc;

use itempipe_client::{
    BATCH_THRESHOLD, ClientError, FailurePolicy, LoggingDiscovery, PreprocessingClient,
    TransportError,
};
use itempipe_manager::{CancellationToken, ManagerServer, ManagerServerConfig, ValueQueue};
use itempipe_protocol::{AgentResult, ItemFlags, ItemState, Measurement, ResultValue, ValueType};
use tempfile::TempDir;

struct Manager {
    dir: TempDir,
    queue: Arc<ValueQueue>,
    shutdown: CancellationToken,
}

impl Manager {
    fn start() -> Self {
        let dir = TempDir::new().unwrap();
        let queue = Arc::new(ValueQueue::new(10_000));
        let config = ManagerServerConfig::default().with_socket_path(dir.path().join("m.sock"));
        let server = ManagerServer::new(queue.clone(), config);

        let listener = server.bind().unwrap();
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        tokio::spawn(async move { server.serve(listener, token).await });

        Self {
            dir,
            queue,
            shutdown,
        }
    }

    fn client(&self) -> PreprocessingClient {
        PreprocessingClient::connect_lazy(self.dir.path().join("m.sock"), Arc::new(LoggingDiscovery))
            .with_policy(FailurePolicy::Propagate)
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn measurement(itemid: u64) -> Measurement {
    Measurement::value(itemid, ValueType::Uint64, AgentResult::uint64(itemid * 10), None)
}

#[tokio::test]
async fn test_flush_then_queue_size() {
    let manager = Manager::start();
    let mut client = manager.client();

    for itemid in 1..=3 {
        client.preprocess_item_value(measurement(itemid)).await.unwrap();
    }
    assert_eq!(client.queue_size().await.unwrap(), 0);

    client.flush().await.unwrap();
    assert_eq!(client.queue_size().await.unwrap(), 3);

    let values = manager.queue.drain(10);
    let ids: Vec<u64> = values.iter().map(|v| v.itemid()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(
        values[1].result().and_then(|r| r.value.clone()),
        Some(ResultValue::Uint64(20))
    );
}

#[tokio::test]
async fn test_threshold_flush_reaches_manager() {
    let manager = Manager::start();
    let mut client = manager.client();

    for itemid in 0..=BATCH_THRESHOLD as u64 {
        client.preprocess_item_value(measurement(itemid)).await.unwrap();
    }

    assert_eq!(client.pending(), 0);
    assert_eq!(
        client.queue_size().await.unwrap(),
        BATCH_THRESHOLD as u64 + 1
    );
}

#[tokio::test]
async fn test_mixed_values_arrive_intact() {
    let manager = Manager::start();
    let mut client = manager.client();

    client
        .preprocess_item_value(Measurement::not_supported(
            5,
            ValueType::Float,
            "Cannot evaluate expression",
            None,
        ))
        .await
        .unwrap();
    client
        .preprocess_item_value(
            Measurement::value(6, ValueType::Text, AgentResult::text("[]"), None)
                .with_flags(ItemFlags::DISCOVERY_RULE),
        )
        .await
        .unwrap();
    client.flush().await.unwrap();

    assert_eq!(client.queue_size().await.unwrap(), 1);
    let value = manager.queue.pop().unwrap();
    assert_eq!(value.itemid(), 5);
    assert_eq!(value.state(), ItemState::NotSupported);
    assert_eq!(value.error(), Some("Cannot evaluate expression"));
}

#[tokio::test]
async fn test_manager_gone() {
    let dir = TempDir::new().unwrap();
    let mut client = PreprocessingClient::connect_lazy(
        dir.path().join("missing.sock"),
        Arc::new(LoggingDiscovery),
    )
    .with_policy(FailurePolicy::Propagate);

    client.preprocess_item_value(measurement(1)).await.unwrap();
    let err = client.flush().await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::Transport(TransportError::Connect { .. })
    ));
    assert!(err.is_fatal());
}
