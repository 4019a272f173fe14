//! Error types for the codec layer.
//!
//! Encoding and decoding fail for different reasons, so they get separate
//! enums: a [`ValidationError`] means the caller handed us a value the wire
//! type can't carry, a [`DecodeError`] means the bytes we were given don't
//! describe a valid value.

use crate::WireType;

/// A value was rejected before being written.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The value's runtime type doesn't fit the wire type.
    #[error("expected {expected} for {wire}, got {found}")]
    TypeMismatch {
        wire: WireType,
        expected: &'static str,
        found: &'static str,
    },

    /// A number (or a vector/color component) is outside the wire range.
    #[error("{value} is out of range [{min}, {max}] for {wire}")]
    OutOfRange {
        wire: WireType,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A string, payload or array is longer than its length prefix allows.
    #[error("length {len} exceeds maximum {max} for {wire}")]
    TooLong {
        wire: WireType,
        len: usize,
        max: usize,
    },

    /// A `Byte` field was given something other than exactly one byte.
    #[error("expected exactly one byte for Byte, got {0}")]
    NotASingleByte(usize),

    /// An ObjectId wasn't a 24 character hex string.
    #[error("invalid ObjectId {0:?}: expected 24 hex characters")]
    InvalidObjectId(String),

    /// A JSON field held something other than an object or array.
    #[error("JsonObject requires an object or array, got {0}")]
    NotAJsonContainer(&'static str),

    /// JSON encoding failed.
    #[error("JSON encode failed: {0}")]
    Json(#[from] serde_json::Error),

    /// zlib compression failed.
    #[error("compression failed: {0}")]
    Compress(#[source] std::io::Error),
}

/// Bytes could not be turned back into a value.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Fewer bytes remain than the field needs.
    #[error("need {needed} bytes at offset {offset}, only {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A string payload wasn't valid UTF-8.
    #[error("invalid UTF-8 in {wire} at offset {offset}")]
    InvalidUtf8 { wire: WireType, offset: usize },

    /// zlib inflate failed.
    #[error("decompression failed: {0}")]
    Decompress(#[source] std::io::Error),

    /// The inflated payload is larger than the configured limit.
    #[error("inflated payload exceeds {max} bytes")]
    InflatedTooLarge { max: usize },

    /// The JSON text inside a JsonObject didn't parse.
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),

    /// A JsonObject payload parsed to a scalar.
    #[error("JsonObject payload is a {0}, expected an object or array")]
    NotAJsonContainer(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = ValidationError::OutOfRange {
            wire: WireType::UInt8,
            value: 256.0,
            min: 0.0,
            max: 255.0,
        };
        assert_eq!(err.to_string(), "256 is out of range [0, 255] for UInt8");
    }

    #[test]
    fn test_eof_message() {
        let err = DecodeError::UnexpectedEof {
            offset: 4,
            needed: 2,
            available: 1,
        };
        assert!(err.to_string().contains("offset 4"));
    }
}
