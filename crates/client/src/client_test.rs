//! Tests for the preprocessing client
//!
//! All tests run against `MockTransport` with `FailurePolicy::Propagate`,
//! so a failing manager shows up as an error instead of ending the test
//! process.

use super::*;
use crate::cache::BATCH_THRESHOLD;
use crate::discovery::LoggingDiscovery;
use crate::error::TransportError;
use crate::test_utils::MockTransport;
use itempipe_protocol::{
    AgentResult, ItemFlags, ItemState, ProtocolError, ResultValue, ValueType, decode_item_values,
};
use parking_lot::Mutex;

/// Discovery handler that remembers every call
#[derive(Default)]
struct RecordingDiscovery {
    calls: Mutex<Vec<(u64, String, Timespec)>>,
}

impl DiscoveryHandler for RecordingDiscovery {
    fn process_discovery_rule(&self, itemid: u64, value: &str, ts: Timespec) {
        self.calls.lock().push((itemid, value.to_string(), ts));
    }
}

fn client_with(
    transport: MockTransport,
    discovery: Arc<RecordingDiscovery>,
) -> PreprocessingClient<MockTransport> {
    PreprocessingClient::new(transport, discovery).with_policy(FailurePolicy::Propagate)
}

fn client() -> (PreprocessingClient<MockTransport>, MockTransport) {
    let transport = MockTransport::new();
    let client = client_with(transport.clone(), Arc::new(RecordingDiscovery::default()));
    (client, transport)
}

fn uint_value(itemid: u64) -> ItemValue {
    ItemValue::normal(itemid, ValueType::Uint64, AgentResult::uint64(itemid), None).unwrap()
}

// ============================================================================
// Policy tests
// ============================================================================

#[test]
fn test_default_policy_is_exit() {
    let client = PreprocessingClient::new(MockTransport::new(), Arc::new(LoggingDiscovery));
    assert_eq!(client.policy(), FailurePolicy::Exit);
}

// ============================================================================
// Batch threshold tests
// ============================================================================

#[tokio::test]
async fn test_threshold_values_do_not_flush() {
    let (mut client, transport) = client();

    for itemid in 0..BATCH_THRESHOLD as u64 {
        client.enqueue(&uint_value(itemid)).await.unwrap();
    }

    assert_eq!(transport.send_count(), 0);
    assert_eq!(client.pending(), BATCH_THRESHOLD);
}

#[tokio::test]
async fn test_value_past_threshold_flushes_once() {
    let (mut client, transport) = client();

    for itemid in 0..=BATCH_THRESHOLD as u64 {
        client.enqueue(&uint_value(itemid)).await.unwrap();
    }

    assert_eq!(transport.send_count(), 1);
    assert_eq!(client.pending(), 0);

    let sent = transport.sent();
    assert_eq!(sent[0].message_type, MessageType::Request);
    assert!(!sent[0].want_reply);

    let values = decode_item_values(sent[0].payload.clone()).unwrap();
    assert_eq!(values.len(), BATCH_THRESHOLD + 1);
    assert_eq!(values[0].itemid(), 0);
    assert_eq!(values[BATCH_THRESHOLD].itemid(), BATCH_THRESHOLD as u64);
}

#[tokio::test]
async fn test_auto_flush_restarts_counting() {
    let (mut client, transport) = client();

    for itemid in 0..(BATCH_THRESHOLD as u64 + 1) * 2 {
        client.enqueue(&uint_value(itemid)).await.unwrap();
    }

    assert_eq!(transport.send_count(), 2);
    assert_eq!(client.stats().batches_flushed, 2);
}

// ============================================================================
// Flush tests
// ============================================================================

#[tokio::test]
async fn test_flush_empty_sends_nothing() {
    let (mut client, transport) = client();

    client.flush().await.unwrap();
    client.flush().await.unwrap();

    assert_eq!(transport.send_count(), 0);
    assert_eq!(client.stats().batches_flushed, 0);
}

#[tokio::test]
async fn test_flush_sends_pending_in_order() {
    let (mut client, transport) = client();
    for itemid in [5, 3, 9] {
        client.enqueue(&uint_value(itemid)).await.unwrap();
    }

    client.flush().await.unwrap();
    client.flush().await.unwrap();

    assert_eq!(transport.send_count(), 1);
    assert_eq!(client.pending(), 0);

    let values = decode_item_values(transport.sent()[0].payload.clone()).unwrap();
    let ids: Vec<u64> = values.iter().map(ItemValue::itemid).collect();
    assert_eq!(ids, vec![5, 3, 9]);
}

#[tokio::test]
async fn test_flush_failure_propagates_and_drops_batch() {
    let (mut client, transport) = client();
    client.enqueue(&uint_value(1)).await.unwrap();
    transport.fail_sends();

    let err = client.flush().await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::Transport(TransportError::Write { .. })
    ));
    assert_eq!(client.pending(), 0);
}

// ============================================================================
// Submission tests
// ============================================================================

#[tokio::test]
async fn test_end_to_end_uint64_value() {
    let (mut client, transport) = client();
    let measurement = Measurement::value(
        1001,
        ValueType::Uint64,
        AgentResult::uint64(57),
        Some(Timespec::new(1_700_000_000, 0)),
    );

    client.preprocess_item_value(measurement).await.unwrap();
    client.flush().await.unwrap();

    let values = decode_item_values(transport.sent()[0].payload.clone()).unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].itemid(), 1001);
    assert_eq!(
        values[0].result().and_then(|r| r.value.clone()),
        Some(ResultValue::Uint64(57))
    );
    assert_eq!(values[0].error(), None);
}

#[tokio::test]
async fn test_not_supported_value_is_enqueued() {
    let (mut client, transport) = client();
    let measurement =
        Measurement::not_supported(7, ValueType::Float, "Timeout while connecting", None);

    client.preprocess_item_value(measurement).await.unwrap();
    client.flush().await.unwrap();

    let values = decode_item_values(transport.sent()[0].payload.clone()).unwrap();
    assert_eq!(values[0].state(), ItemState::NotSupported);
    assert_eq!(values[0].error(), Some("Timeout while connecting"));
}

#[tokio::test]
async fn test_contradictory_measurement_rejected() {
    let (mut client, transport) = client();
    let mut measurement = Measurement::value(8, ValueType::Uint64, AgentResult::uint64(1), None);
    measurement.error = Some("also failed".into());

    let err = client.preprocess_item_value(measurement).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::InvalidValue(ProtocolError::InvalidItemValue { itemid: 8, .. })
    ));
    assert_eq!(client.pending(), 0);
    assert_eq!(transport.send_count(), 0);
}

// ============================================================================
// Discovery branch tests
// ============================================================================

#[tokio::test]
async fn test_discovery_result_goes_to_handler_only() {
    let transport = MockTransport::new();
    let discovery = Arc::new(RecordingDiscovery::default());
    let mut client = client_with(transport.clone(), Arc::clone(&discovery));

    let ts = Timespec::new(1_700_000_000, 1);
    let measurement = Measurement::value(
        42,
        ValueType::Text,
        AgentResult::text(r#"[{"{#FSNAME}":"/"}]"#),
        Some(ts),
    )
    .with_flags(ItemFlags::DISCOVERY_RULE);

    client.preprocess_item_value(measurement).await.unwrap();
    client.flush().await.unwrap();

    let calls = discovery.calls.lock().clone();
    assert_eq!(calls, vec![(42, r#"[{"{#FSNAME}":"/"}]"#.to_string(), ts)]);
    assert_eq!(client.pending(), 0);
    assert_eq!(transport.send_count(), 0);
    assert_eq!(client.stats().discovery_forwarded, 1);
    assert_eq!(client.stats().values_enqueued, 0);
}

#[tokio::test]
async fn test_same_value_without_discovery_flag_is_enqueued() {
    let transport = MockTransport::new();
    let discovery = Arc::new(RecordingDiscovery::default());
    let mut client = client_with(transport.clone(), Arc::clone(&discovery));

    let measurement = Measurement::value(
        42,
        ValueType::Text,
        AgentResult::text(r#"[{"{#FSNAME}":"/"}]"#),
        Some(Timespec::new(1_700_000_000, 1)),
    );

    client.preprocess_item_value(measurement).await.unwrap();

    assert!(discovery.calls.lock().is_empty());
    assert_eq!(client.pending(), 1);
}

#[tokio::test]
async fn test_failed_discovery_rule_is_enqueued() {
    let transport = MockTransport::new();
    let discovery = Arc::new(RecordingDiscovery::default());
    let mut client = client_with(transport.clone(), Arc::clone(&discovery));

    let measurement = Measurement::not_supported(42, ValueType::Text, "Unsupported key", None)
        .with_flags(ItemFlags::DISCOVERY_RULE);

    client.preprocess_item_value(measurement).await.unwrap();

    assert!(discovery.calls.lock().is_empty());
    assert_eq!(client.pending(), 1);
}

#[tokio::test]
async fn test_discovery_without_timestamp_uses_now() {
    let transport = MockTransport::new();
    let discovery = Arc::new(RecordingDiscovery::default());
    let mut client = client_with(transport, Arc::clone(&discovery));

    let before = Timespec::now();
    let measurement = Measurement::value(1, ValueType::Text, AgentResult::text("[]"), None)
        .with_flags(ItemFlags::DISCOVERY_RULE);
    client.preprocess_item_value(measurement).await.unwrap();

    let calls = discovery.calls.lock();
    assert!(calls[0].2.sec >= before.sec);
}

#[tokio::test]
async fn test_closure_as_discovery_handler() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handler = move |itemid: u64, _: &str, _: Timespec| sink.lock().push(itemid);

    let mut client = PreprocessingClient::new(MockTransport::new(), Arc::new(handler))
        .with_policy(FailurePolicy::Propagate);

    let measurement = Measurement::value(3, ValueType::Str, AgentResult::str("[]"), None)
        .with_flags(ItemFlags::DISCOVERY_RULE);
    client.preprocess_item_value(measurement).await.unwrap();

    assert_eq!(*seen.lock(), vec![3]);
}

// ============================================================================
// Queue size tests
// ============================================================================

#[tokio::test]
async fn test_queue_size_decodes_reply() {
    let (mut client, transport) = client();
    transport.push_reply(vec![42u8, 0, 0, 0, 0, 0, 0, 0]);

    assert_eq!(client.queue_size().await.unwrap(), 42);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message_type, MessageType::Queue);
    assert!(sent[0].payload.is_empty());
    assert!(sent[0].want_reply);
}

#[tokio::test]
async fn test_queue_size_does_not_flush() {
    let (mut client, transport) = client();
    client.enqueue(&uint_value(1)).await.unwrap();
    transport.push_reply(vec![0u8; 8]);

    client.queue_size().await.unwrap();

    assert_eq!(client.pending(), 1);
    assert_eq!(transport.send_count(), 1);
}

#[tokio::test]
async fn test_queue_size_short_reply() {
    let (mut client, transport) = client();
    transport.push_reply(vec![1u8, 2]);

    let err = client.queue_size().await.unwrap_err();
    assert!(matches!(err, ClientError::Protocol(ProtocolError::Truncated { .. })));
}

#[tokio::test]
async fn test_queue_size_without_reply() {
    let (mut client, _transport) = client();

    let err = client.queue_size().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(TransportError::Closed)));
}
