//! Unified error type for packwire.

use packwire_codec::{DecodeError, ValidationError};
use packwire_schema::{ErrorKind, PacketError, SchemaError};

/// Top-level error wrapping every packwire failure.
///
/// Lets callers that both build definitions and run packets through them
/// use `?` on either without picking a sub-crate error.
#[derive(Debug, thiserror::Error)]
pub enum PackwireError {
    /// A single value was rejected by the codec.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A single value couldn't be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A definition was assembled incorrectly.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A packet failed to serialize or deserialize.
    #[error(transparent)]
    Packet(#[from] PacketError),

    /// A schema or definition config file didn't parse.
    #[error("invalid schema config: {0}")]
    Config(#[from] serde_json::Error),
}

impl PackwireError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Schema(_) | Self::Config(_) => ErrorKind::Schema,
            Self::Packet(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packwire_schema::DiscriminatorValue;

    #[test]
    fn test_from_schema_error() {
        let err: PackwireError = SchemaError::DuplicateField("id".into()).into();
        assert!(matches!(err, PackwireError::Schema(_)));
        assert!(err.to_string().contains("id"));
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn test_packet_kind_passes_through() {
        let err: PackwireError = PacketError::TrailingBytes { count: 1 }.into();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let err: PackwireError =
            PacketError::from(SchemaError::UnknownVariant(DiscriminatorValue::Int(2))).into();
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn test_config_parse_error_is_schema_kind() {
        let parse = serde_json::from_str::<serde_json::Value>("[{").unwrap_err();
        let err: PackwireError = parse.into();
        assert!(matches!(err, PackwireError::Config(_)));
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn test_from_codec_errors() {
        let err: PackwireError = ValidationError::NotASingleByte(0).into();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err: PackwireError = DecodeError::InflatedTooLarge { max: 8 }.into();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
