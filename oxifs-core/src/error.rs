//! Error types for OxiFS operations.
//!
//! Lookup failures, missing import sources and block corruption are distinct
//! variants because callers recover from them differently: a missing name is
//! retried with another name, a corrupted file has to be removed.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Kind of container entry an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A file node.
    File,
    /// A directory node.
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
        }
    }
}

/// The main error type for OxiFS operations.
#[derive(Debug, Error)]
pub enum OxiFsError {
    /// I/O error from the underlying container or an external file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Name lookup in the current directory failed.
    #[error("No such {kind} in the current directory: {name}")]
    NotFound {
        /// Whether a file or a directory was looked up.
        kind: EntryKind,
        /// The name that was not found.
        name: String,
    },

    /// Import was requested from a path that does not exist.
    #[error("Source file does not exist: {}", path.display())]
    SourceMissing {
        /// The missing source path.
        path: PathBuf,
    },

    /// Stored block checksum does not match the decoded content.
    #[error("Checksum mismatch in block at offset {offset}: stored {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// Offset of the block record.
        offset: u64,
        /// Checksum stored in the block record.
        expected: u32,
        /// Checksum computed from the decoded content.
        computed: u32,
    },

    /// Serialized Huffman tree does not resolve to exactly one root.
    #[error("Malformed Huffman tree: {message}")]
    MalformedTree {
        /// Description of the structural fault.
        message: String,
    },

    /// Bit stream ran out before a leaf was reached.
    #[error("Invalid Huffman code at bit position {bit_position}")]
    InvalidHuffmanCode {
        /// Number of bits consumed when the fault was detected.
        bit_position: u64,
    },

    /// A byte to encode has no leaf in the tree.
    #[error("Byte {byte:#04x} has no leaf in the Huffman tree")]
    SymbolNotInTree {
        /// The unencodable byte.
        byte: u8,
    },

    /// On-disk structure is inconsistent (broken chain, bad offset, bad size).
    #[error("Corrupted container structure at offset {offset}: {message}")]
    CorruptedStructure {
        /// Offset where the inconsistency was detected.
        offset: u64,
        /// Description of the inconsistency.
        message: String,
    },

    /// Entry name cannot be stored.
    #[error("Invalid name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Container grew past what a signed 32-bit offset can address.
    #[error("Container too large: {length} bytes exceeds the 32-bit offset range")]
    ContainerTooLarge {
        /// Length the container would reach.
        length: u64,
    },

    /// Configuration values are out of range.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },
}

/// Result type alias for OxiFS operations.
pub type Result<T> = std::result::Result<T, OxiFsError>;

impl OxiFsError {
    /// Create a not-found error.
    pub fn not_found(kind: EntryKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create a source-missing error.
    pub fn source_missing(path: impl Into<PathBuf>) -> Self {
        Self::SourceMissing { path: path.into() }
    }

    /// Create a checksum mismatch error.
    pub fn checksum_mismatch(offset: u64, expected: u32, computed: u32) -> Self {
        Self::ChecksumMismatch {
            offset,
            expected,
            computed,
        }
    }

    /// Create a malformed tree error.
    pub fn malformed_tree(message: impl Into<String>) -> Self {
        Self::MalformedTree {
            message: message.into(),
        }
    }

    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64) -> Self {
        Self::InvalidHuffmanCode { bit_position }
    }

    /// Create a corrupted structure error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedStructure {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid name error.
    pub fn invalid_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason,
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// True for lookup failures that leave the container untouched.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::SourceMissing { .. })
    }

    /// True when stored content cannot be recovered and the entry should be removed.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::ChecksumMismatch { .. }
                | Self::MalformedTree { .. }
                | Self::InvalidHuffmanCode { .. }
        )
    }
}
