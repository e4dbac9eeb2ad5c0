//! Tests for the bounded value queue

use super::*;
use itempipe_protocol::{AgentResult, ValueType};

fn value(itemid: u64) -> ItemValue {
    ItemValue::normal(itemid, ValueType::Uint64, AgentResult::uint64(itemid), None).unwrap()
}

fn ids(values: &[ItemValue]) -> Vec<u64> {
    values.iter().map(ItemValue::itemid).collect()
}

// ============================================================================
// Construction tests
// ============================================================================

#[test]
fn test_default_capacity() {
    let queue = ValueQueue::default();
    assert_eq!(queue.capacity(), DEFAULT_QUEUE_CAPACITY);
    assert!(queue.is_empty());
}

#[test]
fn test_zero_capacity_holds_one() {
    let queue = ValueQueue::new(0);
    assert_eq!(queue.capacity(), 1);

    queue.push_batch(vec![value(1), value(2)]);
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.pop().map(|v| v.itemid()), Some(2));
}

// ============================================================================
// Ordering tests
// ============================================================================

#[test]
fn test_fifo_across_batches() {
    let queue = ValueQueue::new(10);
    queue.push_batch(vec![value(1), value(2)]);
    queue.push_batch(vec![value(3)]);

    assert_eq!(ids(&queue.drain(10)), vec![1, 2, 3]);
    assert!(queue.is_empty());
}

#[test]
fn test_drain_takes_oldest_first() {
    let queue = ValueQueue::new(10);
    queue.push_batch((1..=5).map(value).collect());

    assert_eq!(ids(&queue.drain(2)), vec![1, 2]);
    assert_eq!(queue.len(), 3);
    assert_eq!(queue.pop().map(|v| v.itemid()), Some(3));
}

// ============================================================================
// Overflow tests
// ============================================================================

#[test]
fn test_overflow_evicts_oldest() {
    let queue = ValueQueue::new(3);

    let evicted = queue.push_batch((1..=5).map(value).collect());

    assert_eq!(evicted, 2);
    assert_eq!(queue.dropped(), 2);
    assert_eq!(queue.received(), 5);
    assert_eq!(ids(&queue.drain(10)), vec![3, 4, 5]);
}

#[test]
fn test_no_eviction_below_capacity() {
    let queue = ValueQueue::new(3);

    assert_eq!(queue.push_batch(vec![value(1), value(2), value(3)]), 0);
    assert_eq!(queue.dropped(), 0);
}

// ============================================================================
// Handler tests
// ============================================================================

#[test]
fn test_handler_reports_current_depth() {
    let queue = ValueQueue::new(10);
    queue.on_values(vec![value(1), value(2)]);
    assert_eq!(queue.queue_size(), 2);

    queue.pop();
    assert_eq!(queue.queue_size(), 1);
}
