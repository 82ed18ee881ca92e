//! Huffman tree construction.
//!
//! Trees are built per block from byte frequencies with the classic greedy
//! merge: the two lowest-frequency nodes are removed from a frequency-ordered
//! list and replaced by their parent until one node is left.
//!
//! Ties are stable: a node is inserted after every node whose frequency is
//! less than or equal to its own, so among equal frequencies the node inserted
//! first is removed first. Leaves are inserted in ascending byte order. The
//! first node removed becomes the left child, the second the right child.

use std::collections::VecDeque;

/// Number of distinct byte values.
pub const BYTE_VALUES: usize = 256;

/// A node of a Huffman tree.
///
/// Internal nodes always own both children. Trees restored from their
/// serialized form carry zero frequencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    /// A symbol.
    Leaf {
        /// The byte this leaf encodes.
        byte: u8,
        /// Occurrences of `byte` in the block.
        frequency: u64,
    },
    /// A merge of two subtrees.
    Internal {
        /// Sum of the children's frequencies.
        frequency: u64,
        /// Subtree reached by a `false` bit.
        left: Box<HuffmanNode>,
        /// Subtree reached by a `true` bit.
        right: Box<HuffmanNode>,
    },
}

impl HuffmanNode {
    /// Create a leaf.
    pub fn leaf(byte: u8, frequency: u64) -> Self {
        Self::Leaf { byte, frequency }
    }

    /// Create an internal node whose frequency is the sum of its children.
    pub fn internal(left: HuffmanNode, right: HuffmanNode) -> Self {
        Self::Internal {
            frequency: left.frequency().saturating_add(right.frequency()),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Frequency of this node.
    pub fn frequency(&self) -> u64 {
        match self {
            Self::Leaf { frequency, .. } | Self::Internal { frequency, .. } => *frequency,
        }
    }

    /// True for leaves.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// Byte value of a leaf; internal nodes report 0.
    pub fn byte(&self) -> u8 {
        match self {
            Self::Leaf { byte, .. } => *byte,
            Self::Internal { .. } => 0,
        }
    }

    /// Compare shape and leaf bytes, ignoring frequencies.
    pub fn same_shape(&self, other: &HuffmanNode) -> bool {
        match (self, other) {
            (Self::Leaf { byte: a, .. }, Self::Leaf { byte: b, .. }) => a == b,
            (
                Self::Internal {
                    left: l1,
                    right: r1,
                    ..
                },
                Self::Internal {
                    left: l2,
                    right: r2,
                    ..
                },
            ) => l1.same_shape(l2) && r1.same_shape(r2),
            _ => false,
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Nodes ordered by ascending frequency, stable among equal frequencies.
#[derive(Debug, Default)]
struct FrequencyList {
    nodes: VecDeque<HuffmanNode>,
}

impl FrequencyList {
    fn insert(&mut self, node: HuffmanNode) {
        let frequency = node.frequency();
        let position = self
            .nodes
            .iter()
            .position(|existing| existing.frequency() > frequency)
            .unwrap_or(self.nodes.len());
        self.nodes.insert(position, node);
    }

    fn pop_first(&mut self) -> Option<HuffmanNode> {
        self.nodes.pop_front()
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// A Huffman tree for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: HuffmanNode,
}

impl HuffmanTree {
    /// Build the tree for `data`.
    ///
    /// A block with a single distinct byte yields a tree whose root is that
    /// leaf. An empty block yields a lone leaf for byte 0.
    pub fn build(data: &[u8]) -> Self {
        let mut frequencies = [0u64; BYTE_VALUES];
        for &byte in data {
            frequencies[byte as usize] += 1;
        }

        let mut list = FrequencyList::default();
        for (byte, &frequency) in frequencies.iter().enumerate() {
            if frequency > 0 {
                list.insert(HuffmanNode::leaf(byte as u8, frequency));
            }
        }

        while list.len() > 1 {
            // len > 1 guarantees both pops succeed
            let (Some(left), Some(right)) = (list.pop_first(), list.pop_first()) else {
                break;
            };
            list.insert(HuffmanNode::internal(left, right));
        }

        let root = list.pop_first().unwrap_or(HuffmanNode::leaf(0, 0));
        Self { root }
    }

    /// Wrap an existing root node.
    pub fn from_root(root: HuffmanNode) -> Self {
        Self { root }
    }

    /// The root node.
    pub fn root(&self) -> &HuffmanNode {
        &self.root
    }

    /// Number of leaves (distinct symbols).
    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Length of the longest code in bits.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Compare shape and leaf bytes with another tree, ignoring frequencies.
    pub fn same_shape(&self, other: &HuffmanTree) -> bool {
        self.root.same_shape(&other.root)
    }

    /// Root-to-leaf path for `byte` (`false` = left, `true` = right).
    pub fn code_for(&self, byte: u8) -> Option<Vec<bool>> {
        fn search(node: &HuffmanNode, byte: u8, path: &mut Vec<bool>) -> bool {
            match node {
                HuffmanNode::Leaf { byte: b, .. } => *b == byte,
                HuffmanNode::Internal { left, right, .. } => {
                    path.push(false);
                    if search(left, byte, path) {
                        return true;
                    }
                    path.pop();
                    path.push(true);
                    if search(right, byte, path) {
                        return true;
                    }
                    path.pop();
                    false
                }
            }
        }

        let mut path = Vec::new();
        search(&self.root, byte, &mut path).then_some(path)
    }
}
