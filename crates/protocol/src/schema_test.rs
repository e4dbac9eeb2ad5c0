//! Tests for schema enums and flags

use crate::error::ProtocolError;
use crate::schema::{ItemFlags, ItemState, StepType, Timespec, ValueType};

// =============================================================================
// ValueType tests
// =============================================================================

#[test]
fn test_value_type_codes() {
    assert_eq!(ValueType::Float.as_u8(), 0);
    assert_eq!(ValueType::Str.as_u8(), 1);
    assert_eq!(ValueType::Log.as_u8(), 2);
    assert_eq!(ValueType::Uint64.as_u8(), 3);
    assert_eq!(ValueType::Text.as_u8(), 4);
}

#[test]
fn test_value_type_from_u8_roundtrip() {
    for vt in [
        ValueType::Float,
        ValueType::Str,
        ValueType::Log,
        ValueType::Uint64,
        ValueType::Text,
    ] {
        assert_eq!(ValueType::from_u8(vt.as_u8()).unwrap(), vt);
    }
}

#[test]
fn test_value_type_unknown() {
    assert_eq!(ValueType::from_u8(5), Err(ProtocolError::InvalidValueType(5)));
}

#[test]
fn test_value_type_is_numeric() {
    assert!(ValueType::Float.is_numeric());
    assert!(ValueType::Uint64.is_numeric());
    assert!(!ValueType::Str.is_numeric());
    assert!(!ValueType::Log.is_numeric());
    assert!(!ValueType::Text.is_numeric());
}

#[test]
fn test_value_type_display() {
    assert_eq!(ValueType::Uint64.to_string(), "uint64");
    assert_eq!(ValueType::Log.to_string(), "log");
}

// =============================================================================
// ItemState tests
// =============================================================================

#[test]
fn test_item_state_codes() {
    assert_eq!(ItemState::from_u8(0).unwrap(), ItemState::Normal);
    assert_eq!(ItemState::from_u8(1).unwrap(), ItemState::NotSupported);
    assert_eq!(ItemState::from_u8(2), Err(ProtocolError::InvalidState(2)));
}

// =============================================================================
// ItemFlags tests
// =============================================================================

#[test]
fn test_flags_discovery_rule() {
    assert!(ItemFlags::DISCOVERY_RULE.is_discovery_rule());
    assert!(!ItemFlags::NORMAL.is_discovery_rule());
    assert!(!ItemFlags::CREATED.is_discovery_rule());
}

#[test]
fn test_flags_combined() {
    let flags = ItemFlags::DISCOVERY_RULE | ItemFlags::CREATED;

    assert_eq!(flags.bits(), 0x05);
    assert!(flags.is_discovery_rule());
    assert!(flags.contains(ItemFlags::CREATED));
    assert!(!flags.contains(ItemFlags::PROTOTYPE));
}

#[test]
fn test_flags_preserve_unknown_bits() {
    let flags = ItemFlags::from_bits(0x81);
    assert_eq!(flags.bits(), 0x81);
    assert!(flags.is_discovery_rule());
}

// =============================================================================
// StepType tests
// =============================================================================

#[test]
fn test_step_type_roundtrip_all_codes() {
    for code in 1..=12u8 {
        let step = StepType::from_u8(code).unwrap();
        assert_eq!(step.as_u8(), code);
    }
}

#[test]
fn test_step_type_unknown() {
    assert_eq!(StepType::from_u8(0), Err(ProtocolError::InvalidStepType(0)));
    assert_eq!(StepType::from_u8(13), Err(ProtocolError::InvalidStepType(13)));
}

#[test]
fn test_step_type_stateful() {
    assert!(StepType::DeltaValue.is_stateful());
    assert!(StepType::DeltaSpeed.is_stateful());
    assert!(!StepType::Regsub.is_stateful());
    assert!(!StepType::Jsonpath.is_stateful());
}

// =============================================================================
// Timespec tests
// =============================================================================

#[test]
fn test_timespec_display() {
    assert_eq!(Timespec::new(1_700_000_000, 42).to_string(), "1700000000.000000042");
}

#[test]
fn test_timespec_now_is_recent() {
    let now = Timespec::now();
    assert!(now.sec > 1_600_000_000);
    assert!((0..1_000_000_000).contains(&now.ns));
}

#[test]
fn test_timespec_from_unix_in_range() {
    assert_eq!(
        Timespec::from_unix(1_700_000_000, 250),
        Timespec::new(1_700_000_000, 250)
    );
}

#[test]
fn test_timespec_from_unix_clamps_past_2038() {
    let ts = Timespec::from_unix(i64::from(i32::MAX) + 1, 7);
    assert_eq!(ts, Timespec::new(i32::MAX, 7));
}

#[test]
fn test_timespec_from_unix_clamps_far_past() {
    let ts = Timespec::from_unix(i64::MIN, 0);
    assert_eq!(ts.sec, i32::MIN);
}
