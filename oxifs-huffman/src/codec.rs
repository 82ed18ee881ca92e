//! Bit-level Huffman encoding and decoding.
//!
//! # Bit contract
//!
//! Encoding walks the tree depth-first for each input byte. When the search
//! unwinds from the matching leaf back to the root, one bit per edge is pushed
//! onto a single [`BitStack`] shared by the whole block (`false` for a left
//! edge, `true` for a right edge). Each symbol's path is therefore pushed
//! leaf-to-root, symbols in input order, and the stack is packed top-first.
//!
//! Decoding unpacks the bytes back into the same stack and pops it: the first
//! pops walk the *last* symbol from the root down. Output is filled from the
//! last index towards the first. A tree whose root is a leaf consumes no bits;
//! every output byte is that leaf's byte.
//!
//! Reversing either the push order or the pop order corrupts only inputs with
//! codes of differing lengths, so both directions are covered by fixed vectors
//! in the tests below.

use crate::tree::{BYTE_VALUES, HuffmanNode, HuffmanTree};
use oxifs_core::bitstream::BitStack;
use oxifs_core::error::{OxiFsError, Result};

/// Push the unwinding path to `byte`, deepest edge first.
fn push_path(node: &HuffmanNode, byte: u8, bits: &mut BitStack) -> bool {
    match node {
        HuffmanNode::Leaf { byte: b, .. } => *b == byte,
        HuffmanNode::Internal { left, right, .. } => {
            if push_path(left, byte, bits) {
                bits.push(false);
                true
            } else if push_path(right, byte, bits) {
                bits.push(true);
                true
            } else {
                false
            }
        }
    }
}

impl HuffmanTree {
    /// Encode `data` and return the packed bit stack.
    ///
    /// The unwinding sequence of each distinct byte is computed once and
    /// replayed for later occurrences; the pushed bits are the same as a fresh
    /// search per byte.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut paths: Vec<Option<BitStack>> = vec![None; BYTE_VALUES];
        let mut bits = BitStack::with_capacity(data.len() * 2);

        for &byte in data {
            let slot = &mut paths[byte as usize];
            if slot.is_none() {
                let mut path = BitStack::new();
                if !push_path(self.root(), byte, &mut path) {
                    return Err(OxiFsError::SymbolNotInTree { byte });
                }
                *slot = Some(path);
            }
            if let Some(path) = slot {
                bits.extend_from(path);
            }
        }

        Ok(bits.to_packed_bytes())
    }

    /// Decode `original_len` bytes from a packed bit stack.
    pub fn decode(&self, packed: &[u8], original_len: usize) -> Result<Vec<u8>> {
        let mut output = vec![0u8; original_len];

        if let HuffmanNode::Leaf { byte, .. } = self.root() {
            output.fill(*byte);
            return Ok(output);
        }

        let mut bits = BitStack::from_packed_bytes(packed);
        for slot in output.iter_mut().rev() {
            let mut node = self.root();
            loop {
                match node {
                    HuffmanNode::Leaf { byte, .. } => {
                        *slot = *byte;
                        break;
                    }
                    HuffmanNode::Internal { left, right, .. } => {
                        let bit = bits
                            .pop()
                            .ok_or_else(|| OxiFsError::invalid_huffman(bits.bits_popped()))?;
                        node = if bit { right } else { left };
                    }
                }
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_two_symbols() {
        // b = 0, a = 1; pushed 1,1,0 -> packed top-first 0,1,1
        let tree = HuffmanTree::build(b"aab");
        assert_eq!(tree.encode(b"aab").unwrap(), vec![0x60]);
    }

    #[test]
    fn test_encode_abracadabra_vector() {
        let data = b"abracadabra";
        let tree = HuffmanTree::build(data);
        let packed = tree.encode(data).unwrap();
        assert_eq!(packed, vec![0x7C, 0xA8, 0xF8]);
        assert_eq!(tree.decode(&packed, data.len()).unwrap(), data);
    }

    #[test]
    fn test_single_leaf_consumes_no_bits() {
        let tree = HuffmanTree::build(b"zzzz");
        let packed = tree.encode(b"zzzz").unwrap();
        assert!(packed.is_empty());
        assert_eq!(tree.decode(&packed, 4).unwrap(), b"zzzz");
    }

    #[test]
    fn test_empty_block() {
        let tree = HuffmanTree::build(b"");
        let packed = tree.encode(b"").unwrap();
        assert!(packed.is_empty());
        assert!(tree.decode(&packed, 0).unwrap().is_empty());
    }

    #[test]
    fn test_symbol_not_in_tree() {
        let tree = HuffmanTree::build(b"aab");
        let err = tree.encode(b"abc").unwrap_err();
        assert!(matches!(err, OxiFsError::SymbolNotInTree { byte: b'c' }));
    }

    #[test]
    fn test_decode_runs_out_of_bits() {
        let tree = HuffmanTree::build(b"abracadabra");
        let err = tree.decode(&[], 3).unwrap_err();
        assert!(matches!(err, OxiFsError::InvalidHuffmanCode { .. }));
    }

    #[test]
    fn test_roundtrip_mixed_code_lengths() {
        let data = b"mississippi river banks, mostly sandy";
        let tree = HuffmanTree::build(data);
        let packed = tree.encode(data).unwrap();
        assert_eq!(tree.decode(&packed, data.len()).unwrap(), data);
    }

    #[test]
    fn test_compresses_skewed_block() {
        let mut data = vec![b'a'; 900];
        data.extend_from_slice(&[b'b'; 100]);
        let tree = HuffmanTree::build(&data);
        let packed = tree.encode(&data).unwrap();
        // One bit per symbol.
        assert_eq!(packed.len(), 125);
        assert_eq!(tree.decode(&packed, data.len()).unwrap(), data);
    }
}
