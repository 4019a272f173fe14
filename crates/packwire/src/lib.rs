//! # Packwire
//!
//! Compact, schema-driven binary packets for game networking.
//!
//! A packet is described once as an ordered list of named, typed fields and
//! then encoded to the smallest byte layout those types allow. The work is
//! split across two crates, re-exported here:
//!
//! - [`codec`]: wire types, values, and the per-type encoder/decoder.
//! - [`schema`]: schemas, plain and discriminated packet definitions.
//!
//! ## Quick Start
//!
//! ```rust
//! use packwire::prelude::*;
//!
//! let position = PacketDefinition::builder()
//!     .add_header("entity", WireType::UInt32)?
//!     .add_data_field("at", WireType::Vector3)?
//!     .unreliable()
//!     .build();
//!
//! let packet = Packet::new(
//!     Record::new().with("entity", 12u32),
//!     Record::new().with("at", Vector3::new(1.0, 2.5, -3.0)),
//! );
//! let bytes = position.serialize(&packet)?;
//! assert_eq!(bytes.len(), 16);
//! assert_eq!(position.deserialize(&bytes)?, packet);
//! # Ok::<(), PackwireError>(())
//! ```

mod error;

pub use error::PackwireError;
pub use packwire_codec as codec;
pub use packwire_schema as schema;

pub mod prelude {
    pub use crate::PackwireError;
    pub use packwire_codec::{
        CodecConfig, Color3, DecodeError, ValidationError, Value, Vector2, Vector3, WireType,
    };
    pub use packwire_schema::{
        DiscriminatedPacket, DiscriminatedPacketDefinition, DiscriminatorValue, ErrorKind,
        Packet, PacketDefinition, PacketError, Record, Reliability, Schema, SchemaError,
    };
}
