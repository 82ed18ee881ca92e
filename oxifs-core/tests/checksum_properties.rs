//! Property tests for the block checksum.

use oxifs_core::checksum::{BlockChecksum, REMAINDER_BITS};
use oxifs_core::config::BLOCK_SIZE;
use proptest::prelude::*;

proptest! {
    #[test]
    fn remainder_fits_and_is_stable(data in proptest::collection::vec(any::<u8>(), 0..=BLOCK_SIZE)) {
        let crc = BlockChecksum::compute(&data);
        prop_assert!(crc < (1 << REMAINDER_BITS));
        prop_assert_eq!(BlockChecksum::compute(&data), crc);
        prop_assert!(BlockChecksum::verify(&data, crc));
    }

    #[test]
    fn any_single_bit_flip_is_detected(
        data in proptest::collection::vec(any::<u8>(), 1..=BLOCK_SIZE),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut flipped = data.clone();
        flipped[position.index(data.len())] ^= 1 << bit;
        prop_assert_ne!(BlockChecksum::compute(&flipped), BlockChecksum::compute(&data));
    }

    #[test]
    fn checksum_is_linear_over_xor(
        pair in (1usize..=256).prop_flat_map(|len| (
            proptest::collection::vec(any::<u8>(), len),
            proptest::collection::vec(any::<u8>(), len),
        ))
    ) {
        let (a, b) = pair;
        let mixed: Vec<u8> = a.iter().zip(&b).map(|(x, y)| x ^ y).collect();
        prop_assert_eq!(
            BlockChecksum::compute(&mixed),
            BlockChecksum::compute(&a) ^ BlockChecksum::compute(&b)
        );
    }
}
