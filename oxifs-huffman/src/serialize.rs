//! Huffman tree serialization.
//!
//! # Byte contract
//!
//! Writing visits every node in the order *self, right subtree, left subtree*
//! and pushes its byte value followed by its flag (`1` leaf, `0` internal;
//! internal nodes carry value `0`) onto a LIFO. The LIFO is emitted top-first,
//! so the stored bytes are `(flag, value)` pairs in post-order
//! *left subtree, right subtree, self*.
//!
//! Reading scans the pairs front to back with an auxiliary stack: a leaf flag
//! pushes a new leaf, an internal flag pops twice, the first pop becoming the
//! right child and the second the left child, and pushes the new node. Exactly
//! one node must remain at the end.
//!
//! ```text
//! tree:  (b, a)        pushes: 00 00 | 61 01 | 62 01
//!                      stored: 01 62 | 01 61 | 00 00
//! ```

use crate::tree::{HuffmanNode, HuffmanTree};
use oxifs_core::error::{OxiFsError, Result};

/// Flag byte marking a leaf.
pub const LEAF_FLAG: u8 = 1;

/// Flag byte marking an internal node.
pub const INTERNAL_FLAG: u8 = 0;

fn push_node(node: &HuffmanNode, stack: &mut Vec<u8>) {
    stack.push(node.byte());
    match node {
        HuffmanNode::Leaf { .. } => stack.push(LEAF_FLAG),
        HuffmanNode::Internal { left, right, .. } => {
            stack.push(INTERNAL_FLAG);
            push_node(right, stack);
            push_node(left, stack);
        }
    }
}

impl HuffmanTree {
    /// Serialize the tree.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut stack = Vec::with_capacity(self.leaf_count() * 4);
        push_node(self.root(), &mut stack);
        // Emit top-first.
        stack.reverse();
        stack
    }

    /// Restore a tree written by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 2 != 0 {
            return Err(OxiFsError::malformed_tree(format!(
                "odd tree length {}",
                bytes.len()
            )));
        }

        let mut stack: Vec<HuffmanNode> = Vec::with_capacity(bytes.len() / 2);
        for (index, pair) in bytes.chunks_exact(2).enumerate() {
            let (flag, value) = (pair[0], pair[1]);
            match flag {
                LEAF_FLAG => stack.push(HuffmanNode::leaf(value, 0)),
                INTERNAL_FLAG => {
                    let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                        return Err(OxiFsError::malformed_tree(format!(
                            "internal node {index} has fewer than two children"
                        )));
                    };
                    stack.push(HuffmanNode::internal(left, right));
                }
                other => {
                    return Err(OxiFsError::malformed_tree(format!(
                        "unknown flag {other:#04x} at pair {index}"
                    )));
                }
            }
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(root), true) => Ok(Self::from_root(root)),
            (None, _) => Err(OxiFsError::malformed_tree("no nodes")),
            (Some(_), false) => Err(OxiFsError::malformed_tree(format!(
                "{} roots left after reading",
                stack.len() + 1
            ))),
        }
    }
}
