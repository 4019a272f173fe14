//! Binary wire codec for packwire.
//!
//! This crate is the bottom layer of the workspace. It knows how to turn a
//! single dynamically-typed [`Value`] into bytes for a given [`WireType`] and
//! back again, but nothing about packets or schemas:
//!
//! - **Cursors** ([`ByteCursor`], [`ByteReader`]): fixed-width and 24-bit
//!   integer primitives over a growable buffer / a borrowed slice.
//! - **Wire types** ([`WireType`]): the closed catalog of encodings.
//! - **Values** ([`Value`], [`Vector2`], [`Vector3`], [`Color3`]): what
//!   callers put into and get out of a field.
//! - **Codec** ([`TypeCodec`]): per-type encode/decode with validation.
//! - **Helpers** ([`obfuscate`], [`compress`]): XOR scrambling and zlib,
//!   used by the long/compressed string types.
//!
//! ```text
//! Value + WireType → TypeCodec::encode → ByteCursor (bytes)
//! bytes + offset + WireType → TypeCodec::decode → (Value, bytes read)
//! ```

mod codec;
pub mod compress;
mod config;
mod cursor;
mod error;
pub mod obfuscate;
mod value;
mod wire;

pub use codec::TypeCodec;
pub use config::CodecConfig;
pub use cursor::{ByteCursor, ByteReader};
pub use error::{DecodeError, ValidationError};
pub use value::{Color3, Value, Vector2, Vector3};
pub use wire::WireType;
