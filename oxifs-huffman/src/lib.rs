//! # OxiFS Huffman
//!
//! Per-block Huffman coding for the OxiFS container.
//!
//! Each block of file content gets its own tree, built from that block's byte
//! frequencies. The tree is stored next to the encoded bits, so blocks decode
//! independently of each other.
//!
//! - [`tree`]: greedy tree construction with stable tie-breaking
//! - [`codec`]: the LIFO bit contract for encoding and decoding
//! - [`serialize`]: compact `(flag, value)` tree serialization
//!
//! ## Example
//!
//! ```rust
//! use oxifs_huffman::{build_tree, deserialize_tree, huffman_decode, huffman_encode, serialize_tree};
//!
//! let block = b"abracadabra";
//! let tree = build_tree(block);
//!
//! let encoded = huffman_encode(&tree, block).unwrap();
//! let tree_bytes = serialize_tree(&tree);
//!
//! let restored = deserialize_tree(&tree_bytes).unwrap();
//! let decoded = huffman_decode(&restored, &encoded, block.len()).unwrap();
//! assert_eq!(decoded, block);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod serialize;
pub mod tree;

pub use serialize::{INTERNAL_FLAG, LEAF_FLAG};
pub use tree::{BYTE_VALUES, HuffmanNode, HuffmanTree};

use oxifs_core::error::Result;

/// Build the Huffman tree for one block.
pub fn build_tree(data: &[u8]) -> HuffmanTree {
    HuffmanTree::build(data)
}

/// Encode a block against its tree, returning the packed bits.
pub fn huffman_encode(tree: &HuffmanTree, data: &[u8]) -> Result<Vec<u8>> {
    tree.encode(data)
}

/// Decode `original_len` bytes from packed bits.
pub fn huffman_decode(tree: &HuffmanTree, packed: &[u8], original_len: usize) -> Result<Vec<u8>> {
    tree.decode(packed, original_len)
}

/// Serialize a tree to its `(flag, value)` byte form.
pub fn serialize_tree(tree: &HuffmanTree) -> Vec<u8> {
    tree.to_bytes()
}

/// Restore a tree from its serialized form.
pub fn deserialize_tree(bytes: &[u8]) -> Result<HuffmanTree> {
    HuffmanTree::from_bytes(bytes)
}
