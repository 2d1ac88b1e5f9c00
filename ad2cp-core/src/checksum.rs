//! The AD2CP 16-bit checksum
//!
//! The accumulator starts at [`CHECKSUM_SEED`] and adds each complete pair of
//! bytes as a little-endian `u16`, wrapping on overflow. An odd trailing byte
//! is added as the high byte of a pair, i.e. it contributes `256 * byte`.

use crate::constants::CHECKSUM_SEED;

/// Compute the checksum of `data`
///
/// Used for both the header (all bytes except the trailing header-checksum
/// field) and the payload (the whole span).
pub fn checksum(data: &[u8]) -> u16 {
    let mut pairs = data.chunks_exact(2);
    let mut sum = pairs.by_ref().fold(CHECKSUM_SEED, |acc, pair| {
        acc.wrapping_add(u16::from_le_bytes([pair[0], pair[1]]))
    });
    if let [last] = pairs.remainder() {
        sum = sum.wrapping_add(u16::from(*last) << 8);
    }
    sum
}
