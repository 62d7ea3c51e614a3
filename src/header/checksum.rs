//! Header checksum
//!
//! The checksum is the sum of all header bytes with the checksum field itself
//! counted as ASCII spaces. Some historic writers summed signed bytes, so both
//! sums are accepted.

use std::ops::Range;

use super::BLOCK_LEN;

/// Location of the checksum field
const CHECKSUM_FIELD: Range<usize> = 148..156;

/// Unsigned checksum of a header block
pub fn compute_checksum(block: &[u8; BLOCK_LEN]) -> u32 {
    block
        .iter()
        .enumerate()
        .map(|(i, &b)| if CHECKSUM_FIELD.contains(&i) { b' ' as u32 } else { b as u32 })
        .sum()
}

fn compute_signed_checksum(block: &[u8; BLOCK_LEN]) -> i64 {
    block
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            if CHECKSUM_FIELD.contains(&i) {
                b' ' as i64
            } else {
                b as i8 as i64
            }
        })
        .sum()
}

/// Check a stored checksum against both the unsigned and signed sums
pub(super) fn checksum_matches(block: &[u8; BLOCK_LEN], stored: u32) -> bool {
    compute_checksum(block) == stored || compute_signed_checksum(block) == stored as i64
}
