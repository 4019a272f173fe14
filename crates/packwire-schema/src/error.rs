//! Error types for the schema layer.

use packwire_codec::{DecodeError, ValidationError, WireType};

use crate::DiscriminatorValue;

/// A definition was assembled incorrectly, or a packet named a variant the
/// definition doesn't know.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The same field name was registered twice in one schema.
    #[error("field {0:?} is already registered")]
    DuplicateField(String),

    /// The discriminator was registered as an ordinary header.
    #[error("{0:?} is the discriminator and can only be set through the packet kind")]
    DiscriminatorField(String),

    /// `discriminator()` was called twice.
    #[error("discriminator {0:?} already has a wire type")]
    DiscriminatorAlreadyDeclared(String),

    /// `build()` was called before `discriminator()`.
    #[error("discriminator {0:?} has no wire type")]
    MissingDiscriminator(String),

    /// The wire type can't produce a hashable discriminator value.
    #[error("{0} cannot be used as a discriminator")]
    UnsupportedDiscriminator(WireType),

    /// A variant key can't be encoded with the discriminator's wire type.
    #[error("variant {value} is not a valid {wire}")]
    VariantKeyMismatch {
        value: DiscriminatorValue,
        wire: WireType,
    },

    /// Two variants were registered for the same discriminator value.
    #[error("variant {0} is already registered")]
    DuplicateVariant(DiscriminatorValue),

    /// No variant is registered for this discriminator value.
    #[error("no variant registered for discriminator {0}")]
    UnknownVariant(DiscriminatorValue),
}

/// The three ways a packet operation can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Encode-time: a value doesn't fit its field.
    Validation,
    /// Decode-time: the bytes don't describe a packet.
    Decode,
    /// Setup or dispatch: the definition itself is at fault.
    Schema,
}

/// Failure of a single `serialize` or `deserialize` call.
///
/// No partial output survives one of these: serialize returns no bytes and
/// deserialize returns no packet.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    /// A record is missing a field the schema requires.
    #[error("field {field:?} is missing")]
    MissingField { field: String },

    /// A field's value was rejected by the codec.
    #[error("field {field:?}: {source}")]
    Validation {
        field: String,
        #[source]
        source: ValidationError,
    },

    /// The encoded message grew past the configured limit.
    #[error("encoded message is {size} bytes, limit is {max}")]
    MessageTooLarge { size: usize, max: usize },

    /// A field couldn't be decoded.
    #[error("field {field:?}: {source}")]
    Decode {
        field: String,
        #[source]
        source: DecodeError,
    },

    /// The buffer doesn't start with the definition's preamble.
    #[error("buffer does not start with the expected preamble")]
    PreambleMismatch,

    /// Bytes were left over after the last field.
    #[error("{count} unread bytes after the last field")]
    TrailingBytes { count: usize },

    /// A schema lookup failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl PacketError {
    /// Groups the error into validation, decode or schema failures.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField { .. } | Self::Validation { .. } | Self::MessageTooLarge { .. } => {
                ErrorKind::Validation
            }
            Self::Decode { .. } | Self::PreambleMismatch | Self::TrailingBytes { .. } => {
                ErrorKind::Decode
            }
            Self::Schema(_) => ErrorKind::Schema,
        }
    }
}
