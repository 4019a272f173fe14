//! zlib compression for the compressed string and JSON wire types.
//!
//! Inflation is capped so a small hostile payload can't expand into an
//! unbounded allocation.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::{DecodeError, ValidationError};

/// Compresses `data` into a zlib stream at `level` (0–9).
pub fn deflate(data: &[u8], level: u32) -> Result<Vec<u8>, ValidationError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level));
    encoder.write_all(data).map_err(ValidationError::Compress)?;
    encoder.finish().map_err(ValidationError::Compress)
}

/// Inflates a zlib stream, failing if the output would exceed `max_len` bytes.
pub fn inflate(data: &[u8], max_len: usize) -> Result<Vec<u8>, DecodeError> {
    let limit = u64::try_from(max_len)
        .unwrap_or(u64::MAX)
        .saturating_add(1);
    let mut decoder = ZlibDecoder::new(data).take(limit);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(DecodeError::Decompress)?;

    if out.len() > max_len {
        return Err(DecodeError::InflatedTooLarge { max: max_len });
    }

    tracing::trace!(compressed = data.len(), inflated = out.len(), "inflated payload");
    Ok(out)
}
