//! Codec configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Limits and tuning shared by every field a definition encodes.
///
/// Fields missing from a deserialized config fall back to their defaults,
/// so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Largest encoded message, and largest inflated payload, in bytes.
    pub max_message_size: usize,

    /// Initial capacity of the per-call working buffer.
    pub scratch_capacity: usize,

    /// zlib level for compressed strings and JSON (0 = store, 9 = best).
    pub compression_level: u32,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_message_size: Self::DEFAULT_MAX_MESSAGE_SIZE,
            scratch_capacity: 1024,
            compression_level: 1,
        }
    }
}

impl CodecConfig {
    /// 4 MB, enough for any message a game client is expected to send.
    pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 4_000_000;

    /// Highest level zlib accepts.
    pub const MAX_COMPRESSION_LEVEL: u32 = 9;

    /// Clamps out-of-range values so the config is safe to use.
    ///
    /// - `max_message_size` is at least 1.
    /// - `scratch_capacity` is at most `max_message_size`.
    /// - `compression_level` is capped at [`Self::MAX_COMPRESSION_LEVEL`].
    pub fn validated(mut self) -> Self {
        if self.max_message_size == 0 {
            warn!("max_message_size is 0; using 1");
            self.max_message_size = 1;
        }
        if self.scratch_capacity > self.max_message_size {
            warn!(
                scratch = self.scratch_capacity,
                max = self.max_message_size,
                "scratch_capacity exceeds max_message_size; clamping"
            );
            self.scratch_capacity = self.max_message_size;
        }
        if self.compression_level > Self::MAX_COMPRESSION_LEVEL {
            warn!(
                level = self.compression_level,
                max = Self::MAX_COMPRESSION_LEVEL,
                "compression_level exceeds maximum; clamping"
            );
            self.compression_level = Self::MAX_COMPRESSION_LEVEL;
        }
        self
    }
}
