//! XOR byte scrambling.
//!
//! This keeps long strings from being readable in a packet capture. It is
//! **not** encryption: the key ships inside every client and the transform is
//! its own inverse.

/// Shared key embedded in every peer. Changing it breaks wire compatibility.
pub const OBFUSCATION_KEY: &[u8] = b"SkibidiToilet";

/// XORs `data` with `key`, repeating the key as needed.
///
/// Applying it twice with the same key returns the input. An empty key leaves
/// the data unchanged.
pub fn xor(data: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return data.to_vec();
    }
    data.iter()
        .zip(key.iter().cycle())
        .map(|(byte, k)| byte ^ k)
        .collect()
}

/// [`xor`] with [`OBFUSCATION_KEY`].
pub fn scramble(data: &[u8]) -> Vec<u8> {
    xor(data, OBFUSCATION_KEY)
}
