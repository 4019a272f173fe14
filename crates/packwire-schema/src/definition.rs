//! Plain packet definitions.
//!
//! A [`PacketDefinitionBuilder`] collects header and data fields; `build()`
//! seals them into a [`PacketDefinition`], which only serializes and
//! deserializes. Extending a definition copies its fields into a fresh
//! builder, so the parent never changes.

use packwire_codec::{ByteCursor, ByteReader, CodecConfig, TypeCodec, Value, WireType};
use serde::{Deserialize, Serialize};

use crate::{Packet, PacketError, Record, Schema, SchemaBuilder, SchemaError};

// ---------------------------------------------------------------------------
// Reliability
// ---------------------------------------------------------------------------

/// Delivery hint for whatever transport carries the packet.
///
/// The codec doesn't look at it; it travels with the definition so a
/// transport can pick a reliable or unreliable channel per packet type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Reliability {
    #[default]
    Reliable,
    Unreliable,
}

// ---------------------------------------------------------------------------
// PacketDefinitionBuilder
// ---------------------------------------------------------------------------

/// Builder for [`PacketDefinition`].
///
/// ```rust
/// use packwire_codec::WireType;
/// use packwire_schema::{Packet, PacketDefinition, Record};
///
/// let definition = PacketDefinition::builder()
///     .add_header("id", WireType::UInt32)?
///     .add_data_field("name", WireType::String16)?
///     .add_data_field("score", WireType::Int32)?
///     .build();
///
/// let packet = Packet::new(
///     Record::new().with("id", 7u32),
///     Record::new().with("name", "Ada").with("score", -5),
/// );
/// let bytes = definition.serialize(&packet)?;
/// assert_eq!(bytes.len(), 24);
/// assert_eq!(definition.deserialize(&bytes)?, packet);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PacketDefinitionBuilder {
    headers: SchemaBuilder,
    data: SchemaBuilder,
    preamble: Vec<u8>,
    reliability: Reliability,
    config: CodecConfig,
}

impl PacketDefinitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a header field.
    ///
    /// # Errors
    /// [`SchemaError::DuplicateField`] if the header already exists.
    pub fn add_header(mut self, name: impl Into<String>, wire: WireType) -> Result<Self, SchemaError> {
        self.headers = self.headers.field(name, wire)?;
        Ok(self)
    }

    /// Registers several header fields in the given order.
    pub fn set_headers<I, N>(mut self, fields: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (N, WireType)>,
        N: Into<String>,
    {
        self.headers = self.headers.set_fields(fields)?;
        Ok(self)
    }

    /// Appends every field of a prebuilt header schema.
    pub fn headers(mut self, schema: &Schema) -> Result<Self, SchemaError> {
        self.headers = self.headers.include(schema)?;
        Ok(self)
    }

    /// Registers a data field.
    pub fn add_data_field(
        mut self,
        name: impl Into<String>,
        wire: WireType,
    ) -> Result<Self, SchemaError> {
        self.data = self.data.field(name, wire)?;
        Ok(self)
    }

    /// Registers several data fields in the given order.
    pub fn set_data_fields<I, N>(mut self, fields: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (N, WireType)>,
        N: Into<String>,
    {
        self.data = self.data.set_fields(fields)?;
        Ok(self)
    }

    /// Appends every field of a prebuilt data schema.
    pub fn data(mut self, schema: &Schema) -> Result<Self, SchemaError> {
        self.data = self.data.include(schema)?;
        Ok(self)
    }

    /// Fixed bytes written before the headers and checked on decode.
    pub fn preamble(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.preamble = bytes.into();
        self
    }

    /// Marks the packet as safe to send unreliably.
    pub fn unreliable(mut self) -> Self {
        self.reliability = Reliability::Unreliable;
        self
    }

    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Seals the definition.
    pub fn build(self) -> PacketDefinition {
        PacketDefinition {
            headers: self.headers.build(),
            data: self.data.build(),
            preamble: self.preamble,
            reliability: self.reliability,
            codec: TypeCodec::new(self.config),
        }
    }
}

// ---------------------------------------------------------------------------
// PacketDefinition
// ---------------------------------------------------------------------------

/// A sealed headers + data layout.
///
/// `serialize` and `deserialize` take `&self` and touch no shared state, so a
/// definition can sit in an `Arc` and be used from any number of tasks.
#[derive(Debug, Clone)]
pub struct PacketDefinition {
    headers: Schema,
    data: Schema,
    preamble: Vec<u8>,
    reliability: Reliability,
    codec: TypeCodec,
}

impl PacketDefinition {
    pub fn builder() -> PacketDefinitionBuilder {
        PacketDefinitionBuilder::new()
    }

    pub fn headers(&self) -> &Schema {
        &self.headers
    }

    pub fn data(&self) -> &Schema {
        &self.data
    }

    pub fn preamble(&self) -> &[u8] {
        &self.preamble
    }

    pub fn reliability(&self) -> Reliability {
        self.reliability
    }

    pub fn config(&self) -> &CodecConfig {
        self.codec.config()
    }

    /// Encodes `packet` as `[preamble][headers][data]`.
    ///
    /// The result is sized exactly to the encoded message.
    pub fn serialize(&self, packet: &Packet) -> Result<Vec<u8>, PacketError> {
        let mut cursor = ByteCursor::with_capacity(self.config().scratch_capacity);
        cursor.write_bytes(&self.preamble);

        encode_fields(&self.codec, &mut cursor, &self.headers, |name| {
            packet.headers.get(name)
        })
        .and_then(|()| {
            encode_fields(&self.codec, &mut cursor, &self.data, |name| {
                packet.data.get(name)
            })
        })
        .inspect_err(|e| tracing::debug!(error = %e, "packet serialize failed"))?;

        let bytes = cursor.into_trimmed();
        tracing::debug!(bytes = bytes.len(), "packet serialized");
        Ok(bytes)
    }

    /// Decodes a buffer produced by [`serialize`](Self::serialize).
    ///
    /// The whole buffer must be consumed; leftover bytes are an error.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Packet, PacketError> {
        self.decode_packet(bytes)
            .inspect(|_| tracing::debug!(bytes = bytes.len(), "packet deserialized"))
            .inspect_err(|e| tracing::debug!(error = %e, "packet deserialize failed"))
    }

    fn decode_packet(&self, bytes: &[u8]) -> Result<Packet, PacketError> {
        if !bytes.starts_with(&self.preamble) {
            return Err(PacketError::PreambleMismatch);
        }
        let mut reader = ByteReader::at(bytes, self.preamble.len());
        let headers = decode_fields(&self.codec, &mut reader, &self.headers)?;
        let data = decode_fields(&self.codec, &mut reader, &self.data)?;
        ensure_consumed(&reader)?;
        Ok(Packet { headers, data })
    }

    /// Starts a new definition from copies of this one's fields.
    ///
    /// Fields can only be added to the returned builder, and nothing done
    /// to it reaches `self`.
    pub fn extend(&self) -> PacketDefinitionBuilder {
        PacketDefinitionBuilder {
            headers: self.headers.to_builder(),
            data: self.data.to_builder(),
            preamble: self.preamble.clone(),
            reliability: self.reliability,
            config: self.codec.config().clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared field-list routines
// ---------------------------------------------------------------------------

/// Encodes each field of `schema` in order, looking values up by name.
pub(crate) fn encode_fields<'a>(
    codec: &TypeCodec,
    cursor: &mut ByteCursor,
    schema: &Schema,
    lookup: impl Fn(&str) -> Option<&'a Value>,
) -> Result<(), PacketError> {
    let max = codec.config().max_message_size;
    for field in schema.fields() {
        let value = lookup(&field.name).ok_or_else(|| PacketError::MissingField {
            field: field.name.clone(),
        })?;
        let written = codec
            .encode(cursor, value, &field.wire)
            .map_err(|source| PacketError::Validation {
                field: field.name.clone(),
                source,
            })?;
        if cursor.len() > max {
            return Err(PacketError::MessageTooLarge {
                size: cursor.len(),
                max,
            });
        }
        tracing::trace!(field = %field.name, wire = %field.wire, bytes = written, "encoded field");
    }
    Ok(())
}

/// Decodes each field of `schema` in order into a fresh record.
pub(crate) fn decode_fields(
    codec: &TypeCodec,
    reader: &mut ByteReader<'_>,
    schema: &Schema,
) -> Result<Record, PacketError> {
    let mut record = Record::new();
    for field in schema.fields() {
        let start = reader.position();
        let value = codec
            .read_value(reader, &field.wire)
            .map_err(|source| PacketError::Decode {
                field: field.name.clone(),
                source,
            })?;
        tracing::trace!(
            field = %field.name,
            wire = %field.wire,
            bytes = reader.position() - start,
            "decoded field"
        );
        record.insert(field.name.clone(), value);
    }
    Ok(record)
}

pub(crate) fn ensure_consumed(reader: &ByteReader<'_>) -> Result<(), PacketError> {
    match reader.remaining() {
        0 => Ok(()),
        count => Err(PacketError::TrailingBytes { count }),
    }
}
