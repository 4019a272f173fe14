//! End-to-end tests for plain and discriminated packet definitions.

use std::sync::Arc;

use packwire_codec::{Value, WireType};
use packwire_schema::{
    DiscriminatedPacket, DiscriminatedPacketDefinition, DiscriminatorValue, ErrorKind, Packet,
    PacketDefinition, PacketError, Record, Schema, SchemaError,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn player_definition() -> PacketDefinition {
    PacketDefinition::builder()
        .add_header("id", WireType::UInt32)
        .unwrap()
        .add_data_field("name", WireType::String16)
        .unwrap()
        .add_data_field("score", WireType::Int32)
        .unwrap()
        .build()
}

fn player(id: u32, name: &str, score: i32) -> Packet {
    Packet::new(
        Record::new().with("id", id),
        Record::new().with("name", name).with("score", score),
    )
}

fn input_definition() -> DiscriminatedPacketDefinition {
    let movement = Schema::builder()
        .field("dx", WireType::Int8)
        .unwrap()
        .field("dy", WireType::Int8)
        .unwrap()
        .build();
    let chat = Schema::builder()
        .field("text", WireType::LongString)
        .unwrap()
        .build();

    DiscriminatedPacketDefinition::builder("op")
        .discriminator(WireType::UInt8)
        .unwrap()
        .add_header("seq", WireType::UInt16)
        .unwrap()
        .add_variant(1, movement)
        .unwrap()
        .add_variant(2, chat)
        .unwrap()
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// Plain definitions
// ---------------------------------------------------------------------------

#[test]
fn test_player_packet_is_24_bytes() {
    let definition = player_definition();
    let packet = player(7, "Ada", -5);

    let bytes = definition.serialize(&packet).unwrap();
    assert_eq!(bytes.len(), 24);
    assert_eq!(&bytes[..4], &7u32.to_le_bytes());
    assert_eq!(&bytes[4..7], b"Ada");
    assert!(bytes[7..20].iter().all(|&b| b == 0));
    assert_eq!(&bytes[20..], &(-5i32).to_le_bytes());

    assert_eq!(definition.deserialize(&bytes).unwrap(), packet);
}

#[test]
fn test_array_field_round_trip() {
    let definition = PacketDefinition::builder()
        .data(
            &Schema::builder()
                .array_field("ids", WireType::UInt16)
                .unwrap()
                .build(),
        )
        .unwrap()
        .build();
    let packet = Packet::new(Record::new(), Record::new().with("ids", vec![1u16, 2, 3]));

    let bytes = definition.serialize(&packet).unwrap();
    assert_eq!(bytes.len(), 8);

    let decoded = definition.deserialize(&bytes).unwrap();
    assert_eq!(
        decoded.data.get("ids"),
        Some(&Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]))
    );
}

#[test]
fn test_extend_leaves_parent_unchanged() {
    let base = player_definition();
    let extended = base
        .extend()
        .add_data_field("level", WireType::UInt8)
        .unwrap()
        .build();

    assert_eq!(base.data().len(), 2);
    assert_eq!(extended.data().len(), 3);
    assert_eq!(
        extended.data().names().collect::<Vec<_>>(),
        ["name", "score", "level"]
    );

    // The parent still encodes its own layout.
    let bytes = base.serialize(&player(1, "x", 0)).unwrap();
    assert_eq!(bytes.len(), 24);

    let mut packet = player(1, "x", 0);
    packet.data.insert("level", 3u8);
    assert_eq!(extended.serialize(&packet).unwrap().len(), 25);
}

#[test]
fn test_extend_rejects_existing_field() {
    let err = player_definition()
        .extend()
        .add_header("id", WireType::UInt8)
        .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateField(name) if name == "id"));
}

#[test]
fn test_validation_error_names_the_field() {
    let definition = player_definition();
    let mut packet = player(1, "Ada", 0);
    packet.data.insert("score", "not a number");

    let err = definition.serialize(&packet).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(matches!(&err, PacketError::Validation { field, .. } if field == "score"));
}

#[test]
fn test_truncated_buffer_is_decode_error() {
    let definition = player_definition();
    let bytes = definition.serialize(&player(1, "Ada", 0)).unwrap();

    let err = definition.deserialize(&bytes[..10]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(matches!(&err, PacketError::Decode { field, .. } if field == "name"));
}

#[test]
fn test_schema_from_json_config() {
    let json = r#"[
        { "name": "id", "wire": "UInt32" },
        { "name": "tags", "wire": { "Array": "DynamicString8" } }
    ]"#;
    let headers: Schema = serde_json::from_str(json).unwrap();
    let definition = PacketDefinition::builder().headers(&headers).unwrap().build();

    let packet = Packet::new(
        Record::new().with("id", 3u32).with("tags", vec!["a", "bc"]),
        Record::new(),
    );
    let bytes = definition.serialize(&packet).unwrap();
    // id(4) + count(2) + "a"(1+1) + "bc"(1+2)
    assert_eq!(bytes.len(), 11);
    assert_eq!(definition.deserialize(&bytes).unwrap(), packet);
}

// ---------------------------------------------------------------------------
// Discriminated definitions
// ---------------------------------------------------------------------------

#[test]
fn test_dispatch_by_discriminator() {
    let definition = input_definition();

    let movement = DiscriminatedPacket::new(
        1,
        Record::new().with("seq", 10u16),
        Record::new().with("dx", -1i8).with("dy", 1i8),
    );
    let chat = DiscriminatedPacket::new(
        2,
        Record::new().with("seq", 11u16),
        Record::new().with("text", "hello there"),
    );

    let movement_bytes = definition.serialize(&movement).unwrap();
    let chat_bytes = definition.serialize(&chat).unwrap();
    assert_eq!(movement_bytes.len(), 5);
    assert_eq!(movement_bytes[0], 1);
    assert_eq!(chat_bytes[0], 2);

    assert_eq!(definition.deserialize(&movement_bytes).unwrap(), movement);
    assert_eq!(definition.deserialize(&chat_bytes).unwrap(), chat);
}

#[test]
fn test_unknown_discriminator_is_schema_error() {
    let definition = input_definition();
    let bytes = [7u8, 0, 0];

    let err = definition.deserialize(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert_eq!(err.to_string(), "no variant registered for discriminator 7");
}

#[test]
fn test_missing_discriminator_byte_is_decode_error() {
    let err = input_definition().deserialize(&[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(matches!(&err, PacketError::Decode { field, .. } if field == "op"));
}

#[test]
fn test_discriminated_extend_adds_variant() {
    let base = input_definition();
    let extended = base
        .extend()
        .add_variant(
            3,
            Schema::builder().field("ping", WireType::UInt32).unwrap().build(),
        )
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(base.variant_count(), 2);
    assert_eq!(extended.variant_count(), 3);
    assert!(base.variant(&DiscriminatorValue::Int(3)).is_err());

    let err = base
        .extend()
        .add_variant(1, Schema::default())
        .unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateVariant(_)));
}

#[test]
fn test_set_headers_rejects_discriminator() {
    let err = DiscriminatedPacketDefinition::builder("op")
        .set_headers([("op", WireType::UInt8)])
        .unwrap_err();
    assert!(matches!(err, SchemaError::DiscriminatorField(_)));
}

/// Builds a one-variant definition keyed by `key` and, if `build()` accepts
/// it, checks that a packet with that key decodes back to the same variant.
fn accepted_key_round_trips(wire: &WireType, key: DiscriminatorValue) -> Result<bool, String> {
    let built = DiscriminatedPacketDefinition::builder("kind")
        .discriminator(wire.clone())
        .and_then(|b| b.add_variant(key.clone(), Schema::default()))
        .and_then(|b| b.build());
    let Ok(definition) = built else {
        return Ok(false);
    };
    let packet = DiscriminatedPacket::new(key.clone(), Record::new(), Record::new());
    let bytes = definition
        .serialize(&packet)
        .map_err(|e| format!("{wire} key {key}: serialize failed: {e}"))?;
    let decoded = definition
        .deserialize(&bytes)
        .map_err(|e| format!("{wire} key {key}: deserialize failed: {e}"))?;
    if decoded.kind != key {
        return Err(format!("{wire} key {key}: decoded as {}", decoded.kind));
    }
    Ok(true)
}

#[test]
fn test_every_accepted_discriminator_key_decodes() {
    let keys: Vec<DiscriminatorValue> = vec![
        true.into(),
        0.into(),
        255.into(),
        (-1).into(),
        70_000.into(),
        "a".into(),
        "exactly8".into(),
        "longer than eight".into(),
        "nul\0inside".into(),
        "507f1f77bcf86cd799439011".into(),
        "507F1F77BCF86CD799439011".into(),
        vec![0x41u8].into(),
        vec![1u8, 2].into(),
    ];
    let wires = [
        WireType::Boolean,
        WireType::UInt8,
        WireType::UInt16,
        WireType::UInt24,
        WireType::UInt32,
        WireType::Int8,
        WireType::Int16,
        WireType::Int32,
        WireType::Byte,
        WireType::String8,
        WireType::String16,
        WireType::String32,
        WireType::String64,
        WireType::DynamicString8,
        WireType::LongString,
        WireType::ZLibCompressedString,
        WireType::ObjectId,
    ];

    for wire in &wires {
        let accepted = keys
            .iter()
            .map(|key| accepted_key_round_trips(wire, key.clone()))
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(accepted.contains(&true), "{wire} accepted no keys");
    }
}

// ---------------------------------------------------------------------------
// Sharing
// ---------------------------------------------------------------------------

#[test]
fn test_definitions_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PacketDefinition>();
    assert_send_sync::<DiscriminatedPacketDefinition>();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_serialize_on_shared_definition() {
    let definition = Arc::new(player_definition());

    let handles: Vec<_> = (0..32u32)
        .map(|i| {
            let definition = Arc::clone(&definition);
            tokio::spawn(async move {
                let packet = player(i, "worker", i as i32 * -3);
                let bytes = definition.serialize(&packet).unwrap();
                (packet, definition.deserialize(&bytes).unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (sent, received) = handle.await.unwrap();
        assert_eq!(sent, received);
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_player_round_trip(id in any::<u32>(), name in "[a-zA-Z0-9 ]{0,16}", score in any::<i32>()) {
        let definition = player_definition();
        let packet = player(id, &name, score);
        let bytes = definition.serialize(&packet).unwrap();
        prop_assert_eq!(bytes.len(), 24);
        let decoded = definition.deserialize(&bytes).unwrap();
        // Trailing spaces survive; only NUL padding is stripped.
        prop_assert_eq!(decoded, packet);
    }

    #[test]
    fn prop_accepted_string_keys_decode(key in "[a-zA-Z0-9_]{0,24}") {
        for wire in [WireType::String8, WireType::String16, WireType::DynamicString8] {
            let result = accepted_key_round_trips(&wire, key.clone().into());
            prop_assert!(result.is_ok(), "{}", result.unwrap_err());
        }
    }

    #[test]
    fn prop_accepted_object_id_keys_decode(key in "[0-9a-fA-F]{24}") {
        let result = accepted_key_round_trips(&WireType::ObjectId, key.into());
        prop_assert!(result.is_ok(), "{}", result.unwrap_err());
    }

    #[test]
    fn prop_discriminated_round_trip(seq in any::<u16>(), dx in any::<i8>(), dy in any::<i8>()) {
        let definition = input_definition();
        let packet = DiscriminatedPacket::new(
            1,
            Record::new().with("seq", seq),
            Record::new().with("dx", dx).with("dy", dy),
        );
        let bytes = definition.serialize(&packet).unwrap();
        prop_assert_eq!(definition.deserialize(&bytes).unwrap(), packet);
    }
}
