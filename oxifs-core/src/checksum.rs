//! Block integrity checksum.
//!
//! Every block record stores a checksum of its uncompressed content. The value
//! is the remainder of a binary polynomial long division:
//!
//! - Divisor: `0x04C11DB7` (the CRC-32 generator without its implicit top bit,
//!   so its bit length is 27)
//! - The message is read MSB-first, byte by byte
//! - `bit_length - 1` zero bits are appended as padding
//! - No initial value, no reflection, no final XOR
//! - The result is the last `bit_length - 1` (26) bits of the working buffer
//!
//! This is deliberately not the table-driven CRC-32 used by ZIP and GZIP; the
//! two produce different values for the same input.
//!
//! # Example
//!
//! ```
//! use oxifs_core::checksum::BlockChecksum;
//!
//! assert_eq!(BlockChecksum::compute(b""), 0);
//! assert_eq!(BlockChecksum::compute(&[0x01]), 0x00C1_1DB7);
//! assert!(BlockChecksum::verify(b"abc", BlockChecksum::compute(b"abc")));
//! ```

/// Divisor polynomial for the block checksum.
pub const CHECKSUM_DIVISOR: u32 = 0x04C1_1DB7;

/// Number of significant bits in [`CHECKSUM_DIVISOR`].
pub const DIVISOR_BIT_LENGTH: usize = bit_length(CHECKSUM_DIVISOR);

/// Number of bits in the remainder.
pub const REMAINDER_BITS: usize = DIVISOR_BIT_LENGTH - 1;

const fn bit_length(mut value: u32) -> usize {
    let mut length = 0;
    while value > 0 {
        length += 1;
        value >>= 1;
    }
    length
}

/// Stateless block checksum calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockChecksum;

impl BlockChecksum {
    /// Compute the checksum of `data`.
    pub fn compute(data: &[u8]) -> u32 {
        let data_bits = data.len() * 8;

        // One bit per slot; the tail holds the zero padding.
        let mut work = vec![0u8; data_bits + REMAINDER_BITS];
        for (i, &byte) in data.iter().enumerate() {
            for bit in 0..8 {
                work[i * 8 + bit] = (byte >> (7 - bit)) & 1;
            }
        }

        for i in 0..data_bits {
            if work[i] == 1 {
                for j in 0..DIVISOR_BIT_LENGTH {
                    work[i + j] ^= ((CHECKSUM_DIVISOR >> (DIVISOR_BIT_LENGTH - 1 - j)) & 1) as u8;
                }
            }
        }

        work[data_bits..]
            .iter()
            .fold(0u32, |remainder, &bit| (remainder << 1) | bit as u32)
    }

    /// Check `data` against a stored checksum.
    pub fn verify(data: &[u8], expected: u32) -> bool {
        Self::compute(data) == expected
    }
}
