//! The closed catalog of wire types.
//!
//! Every field in a schema is tagged with exactly one [`WireType`]. The tag
//! picks the encode/decode algorithm in [`TypeCodec`](crate::TypeCodec); the
//! catalog is versionless, so adding a variant is a wire-format change that
//! every peer has to agree on.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// WireType
// ---------------------------------------------------------------------------

/// Identifies one encoding in the catalog, or an array of one.
///
/// Serialized with serde as its variant name, so a schema field can be written
/// in JSON as `"UInt16"` or `{ "Array": "UInt16" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireType {
    /// 1 byte, 0 or 1.
    Boolean,
    /// 1 byte, 0..=255.
    UInt8,
    /// 2 bytes, 0..=65 535.
    UInt16,
    /// 3 bytes big-endian, 0..=16 777 215.
    UInt24,
    /// 4 bytes, 0..=4 294 967 295.
    UInt32,
    /// 1 byte, -128..=127.
    Int8,
    /// 2 bytes, -32 768..=32 767.
    Int16,
    /// 4 bytes, i32 range.
    Int32,
    /// 4 byte IEEE-754 single.
    Float32,
    /// 8 byte IEEE-754 double.
    Float64,
    /// One raw byte.
    Byte,
    /// Fixed 8 byte string, zero padded.
    String8,
    /// Fixed 16 byte string, zero padded.
    String16,
    /// Fixed 32 byte string, zero padded.
    String32,
    /// Fixed 64 byte string, zero padded.
    String64,
    /// 1 byte length prefix + up to 255 bytes.
    DynamicString8,
    /// 3 byte length prefix + obfuscated bytes.
    LongString,
    /// 3 byte length prefix + obfuscated, zlib-compressed bytes.
    ZLibCompressedString,
    /// 3 byte length prefix + JSON text, obfuscated and compressed.
    JsonObject,
    /// 12 raw bytes, exchanged as a 24 character hex string.
    ObjectId,
    /// Two Float32 components.
    Vector2,
    /// Two Int16 components, floored.
    Vector2Int16,
    /// Three Float32 components.
    Vector3,
    /// Three Int16 components, floored.
    Vector3Int16,
    /// Three bytes, one per channel.
    Color3,
    /// 2 byte element count followed by each element.
    Array(Box<WireType>),
}

impl WireType {
    /// Shorthand for `WireType::Array(Box::new(element))`.
    pub fn array_of(element: WireType) -> Self {
        Self::Array(Box::new(element))
    }

    /// The encoded size in bytes when it doesn't depend on the value.
    ///
    /// Returns `None` for length-prefixed strings, JSON and arrays.
    pub fn fixed_width(&self) -> Option<usize> {
        let width = match self {
            Self::Boolean | Self::UInt8 | Self::Int8 | Self::Byte => 1,
            Self::UInt16 | Self::Int16 => 2,
            Self::UInt24 | Self::Color3 => 3,
            Self::UInt32 | Self::Int32 | Self::Float32 | Self::Vector2Int16 => 4,
            Self::Vector3Int16 => 6,
            Self::Float64 | Self::Vector2 | Self::String8 => 8,
            Self::ObjectId | Self::Vector3 => 12,
            Self::String16 => 16,
            Self::String32 => 32,
            Self::String64 => 64,
            Self::DynamicString8
            | Self::LongString
            | Self::ZLibCompressedString
            | Self::JsonObject
            | Self::Array(_) => return None,
        };
        Some(width)
    }

    /// Returns `true` for the integer types.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::UInt8
                | Self::UInt16
                | Self::UInt24
                | Self::UInt32
                | Self::Int8
                | Self::Int16
                | Self::Int32
        )
    }

    /// Returns `true` for types whose decoded value is a plain string.
    pub fn is_string(&self) -> bool {
        matches!(
            self,
            Self::String8
                | Self::String16
                | Self::String32
                | Self::String64
                | Self::DynamicString8
                | Self::LongString
                | Self::ZLibCompressedString
                | Self::ObjectId
        )
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array(element) => write!(f, "Array<{element}>"),
            // Every other variant prints as its name.
            other => write!(f, "{other:?}"),
        }
    }
}
