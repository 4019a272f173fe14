//! Schemas and packet definitions for packwire.
//!
//! A packet is two records, headers and data, each laid out by a [`Schema`]:
//! an ordered list of named, typed fields. Definitions are assembled with
//! builders and sealed by `build()`; a sealed definition only encodes and
//! decodes, so it can be shared across threads without locking.
//!
//! # Key types
//!
//! - [`Schema`] / [`SchemaBuilder`]: ordered field lists
//! - [`PacketDefinition`]: headers + data, optional preamble
//! - [`DiscriminatedPacketDefinition`]: picks the data schema from a
//!   discriminator header
//! - [`Record`], [`Packet`], [`DiscriminatedPacket`]: the values encoded
//! - [`SchemaError`], [`PacketError`]: setup and per-call failures
//!
//! ```text
//! [preamble][header fields in order][data fields in order]
//! ```

mod definition;
mod discriminated;
mod error;
mod record;
mod schema;

pub use definition::{PacketDefinition, PacketDefinitionBuilder, Reliability};
pub use discriminated::{
    DiscriminatedPacketDefinition, DiscriminatedPacketDefinitionBuilder, DiscriminatorValue,
};
pub use error::{ErrorKind, PacketError, SchemaError};
pub use record::{DiscriminatedPacket, Packet, Record};
pub use schema::{Field, Schema, SchemaBuilder};
