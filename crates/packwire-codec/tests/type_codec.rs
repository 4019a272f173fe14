//! Integration tests for the per-type codec through the public API.

use packwire_codec::{
    ByteCursor, CodecConfig, DecodeError, TypeCodec, Value, Vector3, WireType,
};
use proptest::prelude::*;

// =========================================================================
// Helpers
// =========================================================================

fn round_trip(codec: &TypeCodec, value: &Value, wire: &WireType) -> (Value, usize, usize) {
    let mut cursor = ByteCursor::new();
    let written = codec.encode(&mut cursor, value, wire).unwrap();
    let bytes = cursor.into_trimmed();
    let (decoded, read) = codec.decode(&bytes, 0, wire).unwrap();
    (decoded, written, read)
}

// =========================================================================
// JSON
// =========================================================================

#[test]
fn test_json_object_round_trips_structurally() {
    let codec = TypeCodec::default();
    let json = serde_json::json!({ "a": 1, "b": "x" });
    let (decoded, written, read) =
        round_trip(&codec, &Value::Json(json.clone()), &WireType::JsonObject);
    assert_eq!(decoded, Value::Json(json));
    assert_eq!(written, read);
}

#[test]
fn test_json_array_is_accepted() {
    let codec = TypeCodec::default();
    let json = serde_json::json!([1, 2, { "nested": true }]);
    let (decoded, _, _) = round_trip(&codec, &Value::Json(json.clone()), &WireType::JsonObject);
    assert_eq!(decoded, Value::Json(json));
}

#[test]
fn test_json_payload_is_not_plain_text() {
    let codec = TypeCodec::new(CodecConfig {
        compression_level: 0,
        ..CodecConfig::default()
    });
    let mut cursor = ByteCursor::new();
    let json = serde_json::json!({ "secret": "visible?" });
    codec
        .encode(&mut cursor, &Value::Json(json), &WireType::JsonObject)
        .unwrap();
    // Level 0 stores without compressing, so only the XOR hides the text.
    let bytes = cursor.as_slice();
    let needle = b"visible?";
    assert!(!bytes.windows(needle.len()).any(|w| w == needle));
}

#[test]
fn test_corrupt_json_payload_fails() {
    let codec = TypeCodec::default();
    let mut cursor = ByteCursor::new();
    // Valid compressed string, but its text isn't JSON.
    codec
        .encode(
            &mut cursor,
            &Value::from("not json"),
            &WireType::ZLibCompressedString,
        )
        .unwrap();
    let err = codec
        .decode(cursor.as_slice(), 0, &WireType::JsonObject)
        .unwrap_err();
    assert!(matches!(err, DecodeError::Json(_)));
}

#[test]
fn test_inflate_limit_comes_from_config() {
    let big = "a".repeat(10_000);
    let mut cursor = ByteCursor::new();
    TypeCodec::default()
        .encode(&mut cursor, &Value::Str(big), &WireType::ZLibCompressedString)
        .unwrap();

    let strict = TypeCodec::new(CodecConfig {
        max_message_size: 1_000,
        ..CodecConfig::default()
    });
    let err = strict
        .decode(cursor.as_slice(), 0, &WireType::ZLibCompressedString)
        .unwrap_err();
    assert!(matches!(err, DecodeError::InflatedTooLarge { max: 1_000 }));
}

// =========================================================================
// Arrays
// =========================================================================

#[test]
fn test_uint16_array_layout() {
    let codec = TypeCodec::default();
    let wire = WireType::array_of(WireType::UInt16);
    let (decoded, written, _) = round_trip(&codec, &Value::from(vec![1u16, 2, 3]), &wire);
    assert_eq!(written, 8);
    assert_eq!(decoded, Value::from(vec![1u16, 2, 3]));
}

#[test]
fn test_empty_array_round_trips() {
    let codec = TypeCodec::default();
    let wire = WireType::array_of(WireType::String32);
    let (decoded, written, _) = round_trip(&codec, &Value::Array(vec![]), &wire);
    assert_eq!(written, 2);
    assert_eq!(decoded, Value::Array(vec![]));
}

#[test]
fn test_array_of_vectors() {
    let codec = TypeCodec::default();
    let wire = WireType::array_of(WireType::Vector3);
    let value = Value::from(vec![Vector3::new(1.0, 2.0, 3.0), Vector3::new(-0.5, 0.0, 8.25)]);
    let (decoded, written, _) = round_trip(&codec, &value, &wire);
    assert_eq!(written, 2 + 2 * 12);
    assert_eq!(decoded, value);
}

#[test]
fn test_array_with_too_few_elements_fails() {
    // Count says 3, only one UInt8 follows.
    let bytes = [0u8, 3, 9];
    let err = TypeCodec::default()
        .decode(&bytes, 0, &WireType::array_of(WireType::UInt8))
        .unwrap_err();
    assert!(matches!(err, DecodeError::UnexpectedEof { .. }));
}

// =========================================================================
// Properties
// =========================================================================

proptest! {
    #[test]
    fn prop_int16_round_trips(n in any::<i16>()) {
        let codec = TypeCodec::default();
        let (decoded, written, read) = round_trip(&codec, &Value::from(n), &WireType::Int16);
        prop_assert_eq!(decoded, Value::from(n));
        prop_assert_eq!(written, 2);
        prop_assert_eq!(read, 2);
    }

    #[test]
    fn prop_uint24_round_trips(n in 0u32..=0xFF_FFFF) {
        let codec = TypeCodec::default();
        let (decoded, _, _) = round_trip(&codec, &Value::from(n), &WireType::UInt24);
        prop_assert_eq!(decoded, Value::from(n));
    }

    #[test]
    fn prop_long_string_round_trips(text in ".{0,512}") {
        let codec = TypeCodec::default();
        let (decoded, written, read) =
            round_trip(&codec, &Value::Str(text.clone()), &WireType::LongString);
        prop_assert_eq!(decoded, Value::Str(text.clone()));
        prop_assert_eq!(written, 3 + text.len());
        prop_assert_eq!(read, written);
    }

    #[test]
    fn prop_fixed_string_never_exceeds_width(text in "[a-z]{0,40}") {
        let codec = TypeCodec::default();
        let (decoded, written, _) =
            round_trip(&codec, &Value::Str(text.clone()), &WireType::String32);
        prop_assert_eq!(written, 32);
        let expected: String = text.chars().take(32).collect();
        prop_assert_eq!(decoded, Value::Str(expected));
    }
}
