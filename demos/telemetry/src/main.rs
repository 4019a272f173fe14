use std::sync::Arc;

use packwire::prelude::*;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// Per-entity position update, sent every tick.
fn position_definition() -> Result<PacketDefinition, PackwireError> {
    Ok(PacketDefinition::builder()
        .add_header("tick", WireType::UInt24)?
        .add_header("entity", WireType::UInt16)?
        .add_data_field("at", WireType::Vector3Int16)?
        .add_data_field("facing", WireType::Vector2)?
        .unreliable()
        .build())
}

/// Gameplay events, laid out by the `event` header.
fn event_definition() -> Result<DiscriminatedPacketDefinition, PackwireError> {
    let hit = Schema::builder()
        .field("target", WireType::UInt16)?
        .field("damage", WireType::Int16)?
        .build();
    let chat = Schema::builder()
        .field("text", WireType::LongString)?
        .build();
    let loadout = Schema::builder()
        .array_field("items", WireType::UInt16)?
        .field("extra", WireType::ZLibCompressedString)?
        .build();

    Ok(DiscriminatedPacketDefinition::builder("event")
        .discriminator(WireType::UInt8)?
        .add_header("tick", WireType::UInt24)?
        .add_variant(1, hit)?
        .add_variant(2, chat)?
        .add_variant(3, loadout)?
        .build()?)
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

fn position_packet(tick: u32, entity: u16) -> Packet {
    let t = tick as f32 + f32::from(entity);
    Packet::new(
        Record::new().with("tick", tick).with("entity", entity),
        Record::new()
            .with("at", Vector3::new(t * 1.5, 0.0, -t))
            .with("facing", Vector2::new(t.cos(), t.sin())),
    )
}

fn event_packet(tick: u32) -> DiscriminatedPacket {
    let headers = Record::new().with("tick", tick);
    match tick % 3 {
        0 => DiscriminatedPacket::new(
            1,
            headers,
            Record::new().with("target", 4u16).with("damage", -25i16),
        ),
        1 => DiscriminatedPacket::new(
            2,
            headers,
            Record::new().with("text", format!("gg at tick {tick}")),
        ),
        _ => DiscriminatedPacket::new(
            3,
            headers,
            Record::new()
                .with("items", vec![101u16, 202, 303])
                .with("extra", "ammo=30;ammo=30;ammo=30;ammo=30"),
        ),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let positions = Arc::new(position_definition()?);
    let events = Arc::new(event_definition()?);
    let (tx, mut rx) = mpsc::channel::<Vec<u8>>(64);

    const ENTITIES: u16 = 4;
    const TICKS: u32 = 5;

    // One producer per entity, all sharing the same sealed definition.
    let mut producers = Vec::new();
    for entity in 0..ENTITIES {
        let positions = Arc::clone(&positions);
        let tx = tx.clone();
        producers.push(tokio::spawn(async move {
            for tick in 0..TICKS {
                let bytes = positions.serialize(&position_packet(tick, entity))?;
                if tx.send(bytes).await.is_err() {
                    break;
                }
            }
            Ok::<(), PacketError>(())
        }));
    }
    drop(tx);

    let consumer = {
        let positions = Arc::clone(&positions);
        tokio::spawn(async move {
            let (mut count, mut total) = (0usize, 0usize);
            while let Some(bytes) = rx.recv().await {
                let packet = positions.deserialize(&bytes)?;
                tracing::debug!(headers = ?packet.headers, "position received");
                count += 1;
                total += bytes.len();
            }
            Ok::<_, PacketError>((count, total))
        })
    };

    for producer in producers {
        producer.await??;
    }
    let (count, total) = consumer.await??;
    tracing::info!(
        packets = count,
        bytes = total,
        reliability = ?positions.reliability(),
        "position stream done"
    );

    for tick in 0..TICKS {
        let packet = event_packet(tick);
        let bytes = events.serialize(&packet)?;
        let decoded = events.deserialize(&bytes)?;
        tracing::info!(kind = %decoded.kind, bytes = bytes.len(), "event round-tripped");
    }

    // An event type this build doesn't know about.
    let unknown = DiscriminatedPacket::new(9, Record::new().with("tick", 0u32), Record::new());
    if let Err(e) = events.serialize(&unknown) {
        tracing::info!(error = %e, kind = ?e.kind(), "rejected unknown event");
    }

    let summary = serde_json::json!({
        "position_headers": positions.headers().names().collect::<Vec<_>>(),
        "event_variants": events.variant_count(),
    });
    tracing::info!(%summary, "definitions");
    Ok(())
}
