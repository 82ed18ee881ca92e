//! LIFO bit stack for the Huffman block codec.
//!
//! The codec does not stream bits front to back. Encoding pushes every edge of
//! every symbol's path onto one stack shared by the whole block, and the stack
//! is packed top-first. Decoding rebuilds the same stack from the packed bytes
//! and pops it, which yields the symbols in reverse input order.
//!
//! # Bit Ordering
//!
//! Packing: the `i`-th bit counted from the top of the stack lands in byte
//! `i / 8` at bit position `7 - i % 8` (MSB-first). Unused trailing bits of the
//! last byte are zero.
//!
//! Unpacking: bytes are visited from last to first and, within a byte, from the
//! low bit to the high bit, each bit pushed in turn. The first byte's high bit
//! is therefore pushed last and popped first, so pops reproduce the packed
//! order, followed by the zero padding.
//!
//! # Example
//!
//! ```
//! use oxifs_core::bitstream::BitStack;
//!
//! let mut bits = BitStack::new();
//! for bit in [true, true, false] {
//!     bits.push(bit);
//! }
//! let packed = bits.to_packed_bytes();
//! assert_eq!(packed, vec![0b0110_0000]);
//!
//! let mut restored = BitStack::from_packed_bytes(&packed);
//! assert_eq!(restored.pop(), Some(false));
//! assert_eq!(restored.pop(), Some(true));
//! assert_eq!(restored.pop(), Some(true));
//! ```

/// A last-in-first-out sequence of bits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitStack {
    /// Bits in push order; the top of the stack is the last element.
    bits: Vec<bool>,
    /// Total bits popped (for error reporting).
    popped: u64,
}

impl BitStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty stack with room for `bits` bits.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bits: Vec::with_capacity(bits),
            popped: 0,
        }
    }

    /// Push one bit.
    #[inline]
    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Pop the most recently pushed bit.
    #[inline]
    pub fn pop(&mut self) -> Option<bool> {
        let bit = self.bits.pop()?;
        self.popped += 1;
        Some(bit)
    }

    /// Push every bit of `other`, in the order they were pushed there.
    pub fn extend_from(&mut self, other: &BitStack) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Number of bits on the stack.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True when no bits remain.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of bits popped so far.
    pub fn bits_popped(&self) -> u64 {
        self.popped
    }

    /// Pack the stack top-first into bytes, MSB-first within each byte.
    pub fn to_packed_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.bits.len().div_ceil(8)];
        for (i, &bit) in self.bits.iter().rev().enumerate() {
            if bit {
                bytes[i / 8] |= 1 << (7 - i % 8);
            }
        }
        bytes
    }

    /// Rebuild a stack from bytes produced by [`to_packed_bytes`](Self::to_packed_bytes).
    ///
    /// Padding bits become part of the stack; they sit at the bottom and are
    /// only reached after every real bit has been popped.
    pub fn from_packed_bytes(bytes: &[u8]) -> Self {
        let mut stack = Self::with_capacity(bytes.len() * 8);
        for &byte in bytes.iter().rev() {
            for shift in 0..8 {
                stack.push(byte & (1 << shift) != 0);
            }
        }
        stack
    }
}
