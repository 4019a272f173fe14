//! Discriminated (tagged-union) packet definitions.
//!
//! One header field, the discriminator, selects which data schema follows
//! the headers. The variant table is filled in on the builder and frozen by
//! `build()`; looking up a value that was never registered is always an
//! error, never a fallback to some default layout.

use std::collections::HashMap;
use std::fmt;

use packwire_codec::{ByteCursor, ByteReader, CodecConfig, TypeCodec, Value, WireType};
use serde::{Deserialize, Serialize};

use crate::definition::{decode_fields, encode_fields, ensure_consumed};
use crate::{DiscriminatedPacket, PacketError, Reliability, Schema, SchemaBuilder, SchemaError};

// ---------------------------------------------------------------------------
// DiscriminatorValue
// ---------------------------------------------------------------------------

/// A value that can select a variant.
///
/// Only integer, boolean, byte and string wire types can be discriminators,
/// so the key is always hashable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscriminatorValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
}

impl DiscriminatorValue {
    /// Converts a decoded field value into a key.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Int(n) => Some(Self::Int(*n)),
            Value::Str(s) => Some(Self::Str(s.clone())),
            Value::Bytes(b) => Some(Self::Bytes(b.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(n) => Value::Int(*n),
            Self::Str(s) => Value::Str(s.clone()),
            Self::Bytes(b) => Value::Bytes(b.clone()),
        }
    }

    fn supports(wire: &WireType) -> bool {
        wire.is_integer() || wire.is_string() || matches!(wire, WireType::Boolean | WireType::Byte)
    }
}

impl fmt::Display for DiscriminatorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Bytes(b) => write!(f, "{b:02x?}"),
        }
    }
}

impl From<bool> for DiscriminatorValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for DiscriminatorValue {
                fn from(v: $t) -> Self {
                    Self::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(u8, u16, u32, i8, i16, i32, i64);

impl From<Vec<u8>> for DiscriminatorValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&[u8]> for DiscriminatorValue {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<&str> for DiscriminatorValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for DiscriminatorValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`DiscriminatedPacketDefinition`].
///
/// The discriminator's name is fixed by [`new`](Self::new); its wire type is
/// declared once with [`discriminator`](Self::discriminator), which also fixes
/// its position among the headers.
#[derive(Debug, Clone)]
pub struct DiscriminatedPacketDefinitionBuilder {
    key: String,
    headers: SchemaBuilder,
    discriminator: Option<WireType>,
    variants: HashMap<DiscriminatorValue, Schema>,
    reliability: Reliability,
    config: CodecConfig,
}

impl DiscriminatedPacketDefinitionBuilder {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            headers: SchemaBuilder::new(),
            discriminator: None,
            variants: HashMap::new(),
            reliability: Reliability::default(),
            config: CodecConfig::default(),
        }
    }

    /// Declares the discriminator's wire type and appends it to the headers.
    ///
    /// # Errors
    /// - [`SchemaError::DiscriminatorAlreadyDeclared`] on a second call.
    /// - [`SchemaError::UnsupportedDiscriminator`] for floats, vectors,
    ///   colors, JSON and arrays.
    pub fn discriminator(mut self, wire: WireType) -> Result<Self, SchemaError> {
        if self.discriminator.is_some() {
            return Err(SchemaError::DiscriminatorAlreadyDeclared(self.key));
        }
        if !DiscriminatorValue::supports(&wire) {
            return Err(SchemaError::UnsupportedDiscriminator(wire));
        }
        self.headers = self.headers.field(self.key.clone(), wire.clone())?;
        self.discriminator = Some(wire);
        Ok(self)
    }

    /// Registers an ordinary header field.
    ///
    /// # Errors
    /// [`SchemaError::DiscriminatorField`] if `name` is the discriminator.
    pub fn add_header(mut self, name: impl Into<String>, wire: WireType) -> Result<Self, SchemaError> {
        let name = name.into();
        if name == self.key {
            return Err(SchemaError::DiscriminatorField(name));
        }
        self.headers = self.headers.field(name, wire)?;
        Ok(self)
    }

    /// Registers several header fields; none may be the discriminator.
    pub fn set_headers<I, N>(self, fields: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (N, WireType)>,
        N: Into<String>,
    {
        fields
            .into_iter()
            .try_fold(self, |builder, (name, wire)| builder.add_header(name, wire))
    }

    /// Registers the data schema used when the discriminator equals `value`.
    ///
    /// # Errors
    /// [`SchemaError::DuplicateVariant`] if `value` already has a schema.
    pub fn add_variant(
        mut self,
        value: impl Into<DiscriminatorValue>,
        data: Schema,
    ) -> Result<Self, SchemaError> {
        let value = value.into();
        if self.variants.contains_key(&value) {
            return Err(SchemaError::DuplicateVariant(value));
        }
        self.variants.insert(value, data);
        Ok(self)
    }

    pub fn unreliable(mut self) -> Self {
        self.reliability = Reliability::Unreliable;
        self
    }

    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Seals the definition.
    ///
    /// # Errors
    /// - [`SchemaError::MissingDiscriminator`] if no wire type was declared.
    /// - [`SchemaError::VariantKeyMismatch`] if a variant key can't be
    ///   written with the discriminator's wire type, or wouldn't read back
    ///   as the same key.
    pub fn build(self) -> Result<DiscriminatedPacketDefinition, SchemaError> {
        let Some(wire) = self.discriminator else {
            return Err(SchemaError::MissingDiscriminator(self.key));
        };
        let codec = TypeCodec::new(self.config);

        if let Some(value) = self.variants.keys().find(|v| !round_trips(&codec, v, &wire)) {
            return Err(SchemaError::VariantKeyMismatch {
                value: value.clone(),
                wire,
            });
        }

        tracing::debug!(
            key = %self.key,
            %wire,
            variants = self.variants.len(),
            "discriminated definition built"
        );

        Ok(DiscriminatedPacketDefinition {
            key: self.key,
            wire,
            headers: self.headers.build(),
            variants: self.variants,
            reliability: self.reliability,
            codec,
        })
    }
}

/// Whether `value` decodes back to itself through `wire`.
///
/// Fixed strings truncate, ObjectId lowercases and Byte decodes to bytes, so
/// a key that merely encodes could still never be matched on decode.
fn round_trips(codec: &TypeCodec, value: &DiscriminatorValue, wire: &WireType) -> bool {
    let mut cursor = ByteCursor::new();
    if codec.encode(&mut cursor, &value.to_value(), wire).is_err() {
        return false;
    }
    codec
        .decode(cursor.as_slice(), 0, wire)
        .ok()
        .and_then(|(decoded, _)| DiscriminatorValue::from_value(&decoded))
        .is_some_and(|decoded| decoded == *value)
}

// ---------------------------------------------------------------------------
// DiscriminatedPacketDefinition
// ---------------------------------------------------------------------------

/// A sealed tagged-union layout.
///
/// Wire layout is `[headers, discriminator included][variant data]`, with no
/// preamble.
#[derive(Debug, Clone)]
pub struct DiscriminatedPacketDefinition {
    key: String,
    wire: WireType,
    headers: Schema,
    variants: HashMap<DiscriminatorValue, Schema>,
    reliability: Reliability,
    codec: TypeCodec,
}

impl DiscriminatedPacketDefinition {
    pub fn builder(key: impl Into<String>) -> DiscriminatedPacketDefinitionBuilder {
        DiscriminatedPacketDefinitionBuilder::new(key)
    }

    /// Name of the discriminator header.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn discriminator_wire(&self) -> &WireType {
        &self.wire
    }

    /// Header schema, discriminator included.
    pub fn headers(&self) -> &Schema {
        &self.headers
    }

    pub fn reliability(&self) -> Reliability {
        self.reliability
    }

    /// The data schema registered for `value`.
    pub fn variant(&self, value: &DiscriminatorValue) -> Result<&Schema, SchemaError> {
        self.variants
            .get(value)
            .ok_or_else(|| SchemaError::UnknownVariant(value.clone()))
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    /// Encodes the headers with `packet.kind` as the discriminator, then the
    /// data with the variant's schema.
    pub fn serialize(&self, packet: &DiscriminatedPacket) -> Result<Vec<u8>, PacketError> {
        self.encode_packet(packet)
            .inspect(|bytes| {
                tracing::debug!(kind = %packet.kind, bytes = bytes.len(), "packet serialized");
            })
            .inspect_err(|e| {
                tracing::debug!(kind = %packet.kind, error = %e, "packet serialize failed");
            })
    }

    fn encode_packet(&self, packet: &DiscriminatedPacket) -> Result<Vec<u8>, PacketError> {
        let kind = packet.kind.to_value();
        let mut cursor = ByteCursor::with_capacity(self.codec.config().scratch_capacity);

        encode_fields(&self.codec, &mut cursor, &self.headers, |name| {
            if name == self.key {
                Some(&kind)
            } else {
                packet.headers.get(name)
            }
        })?;

        let data = self.variant(&packet.kind)?;
        encode_fields(&self.codec, &mut cursor, data, |name| packet.data.get(name))?;

        Ok(cursor.into_trimmed())
    }

    /// Decodes the headers, picks the variant from the discriminator, then
    /// decodes the data. The discriminator is moved out of `headers` into
    /// `kind`.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<DiscriminatedPacket, PacketError> {
        self.decode_packet(bytes)
            .inspect(|packet| {
                tracing::debug!(kind = %packet.kind, bytes = bytes.len(), "packet deserialized");
            })
            .inspect_err(|e| tracing::debug!(error = %e, "packet deserialize failed"))
    }

    fn decode_packet(&self, bytes: &[u8]) -> Result<DiscriminatedPacket, PacketError> {
        let mut reader = ByteReader::new(bytes);
        let mut headers = decode_fields(&self.codec, &mut reader, &self.headers)?;

        let kind = headers
            .remove(&self.key)
            .as_ref()
            .and_then(DiscriminatorValue::from_value)
            .ok_or_else(|| SchemaError::UnsupportedDiscriminator(self.wire.clone()))?;

        let schema = self.variant(&kind)?;
        let data = decode_fields(&self.codec, &mut reader, schema)?;
        ensure_consumed(&reader)?;

        Ok(DiscriminatedPacket {
            kind,
            headers,
            data,
        })
    }

    /// Starts a new definition from copies of this one's headers and
    /// variants. The discriminator stays declared.
    pub fn extend(&self) -> DiscriminatedPacketDefinitionBuilder {
        DiscriminatedPacketDefinitionBuilder {
            key: self.key.clone(),
            headers: self.headers.to_builder(),
            discriminator: Some(self.wire.clone()),
            variants: self.variants.clone(),
            reliability: self.reliability,
            config: self.codec.config().clone(),
        }
    }
}
