//! Tests for the scalar codec

use bytes::{Bytes, BytesMut};

use crate::codec::*;
use crate::error::ProtocolError;

// =============================================================================
// Fixed-width scalars
// =============================================================================

#[test]
fn test_scalars_are_little_endian() {
    let mut buf = BytesMut::new();
    put_u64(&mut buf, 0x0102_0304_0506_0708);
    put_i32(&mut buf, -2);

    assert_eq!(
        &buf[..],
        &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 0xfe, 0xff, 0xff, 0xff]
    );
}

#[test]
fn test_scalars_read_back() {
    let mut buf = BytesMut::new();
    put_u8(&mut buf, 7);
    put_u64(&mut buf, u64::MAX);
    put_i32(&mut buf, i32::MIN);
    put_f64(&mut buf, -1.5);

    let mut bytes = buf.freeze();
    assert_eq!(get_u8(&mut bytes, "a").unwrap(), 7);
    assert_eq!(get_u64(&mut bytes, "b").unwrap(), u64::MAX);
    assert_eq!(get_i32(&mut bytes, "c").unwrap(), i32::MIN);
    assert_eq!(get_f64(&mut bytes, "d").unwrap(), -1.5);
    assert!(bytes.is_empty());
}

#[test]
fn test_get_u64_truncated() {
    let mut bytes = Bytes::from_static(&[1, 2, 3]);
    let err = get_u64(&mut bytes, "itemid").unwrap_err();

    assert_eq!(err, ProtocolError::truncated("itemid", 8, 3));
}

// =============================================================================
// Strings
// =============================================================================

#[test]
fn test_string_layout_counts_nul() {
    let mut buf = BytesMut::new();
    put_str(&mut buf, Some("abc"));

    assert_eq!(&buf[..], &[4, 0, 0, 0, b'a', b'b', b'c', 0]);
}

#[test]
fn test_absent_string_is_zero_length() {
    let mut buf = BytesMut::new();
    put_str(&mut buf, None);

    assert_eq!(&buf[..], &[0, 0, 0, 0]);

    let mut bytes = buf.freeze();
    assert_eq!(get_str(&mut bytes, "s").unwrap(), None);
    assert!(bytes.is_empty());
}

#[test]
fn test_empty_string_differs_from_absent() {
    let mut buf = BytesMut::new();
    put_str(&mut buf, Some(""));

    assert_eq!(&buf[..], &[1, 0, 0, 0, 0]);

    let mut bytes = buf.freeze();
    assert_eq!(get_str(&mut bytes, "s").unwrap(), Some(String::new()));
}

#[test]
fn test_string_with_unicode() {
    let mut buf = BytesMut::new();
    put_str(&mut buf, Some("température ✓"));

    let mut bytes = buf.freeze();
    assert_eq!(
        get_str(&mut bytes, "s").unwrap().as_deref(),
        Some("température ✓")
    );
}

#[test]
fn test_string_missing_nul() {
    let mut bytes = Bytes::from_static(&[2, 0, 0, 0, b'a', b'b']);
    let err = get_str(&mut bytes, "error").unwrap_err();

    assert!(matches!(
        err,
        ProtocolError::InvalidString { field: "error", .. }
    ));
}

#[test]
fn test_string_invalid_utf8() {
    let mut bytes = Bytes::from_static(&[3, 0, 0, 0, 0xff, 0xfe, 0]);
    let err = get_str(&mut bytes, "error").unwrap_err();

    assert!(matches!(err, ProtocolError::InvalidString { .. }));
}

#[test]
fn test_string_length_beyond_buffer() {
    let mut bytes = Bytes::from_static(&[100, 0, 0, 0, b'a', 0]);
    let err = get_str(&mut bytes, "params").unwrap_err();

    assert_eq!(err, ProtocolError::truncated("params", 100, 2));
}

// =============================================================================
// Markers
// =============================================================================

#[test]
fn test_markers() {
    let mut buf = BytesMut::new();
    put_marker(&mut buf, true);
    put_marker(&mut buf, false);

    assert_eq!(&buf[..], &[MARKER_PRESENT, MARKER_ABSENT]);

    let mut bytes = buf.freeze();
    assert!(get_marker(&mut bytes, "ts").unwrap());
    assert!(!get_marker(&mut bytes, "ts").unwrap());
}

#[test]
fn test_invalid_marker() {
    let mut bytes = Bytes::from_static(&[2]);
    let err = get_marker(&mut bytes, "ts").unwrap_err();

    assert_eq!(
        err,
        ProtocolError::InvalidMarker {
            field: "ts",
            value: 2
        }
    );
}
