//! # OxiFS Core
//!
//! Core components for the OxiFS container file system.
//!
//! This crate provides the fundamental building blocks shared by the codec and
//! the container store:
//!
//! - [`checksum`]: Polynomial long-division checksum for block integrity
//! - [`bitstream`]: LIFO bit stack used by the Huffman codec's bit contract
//! - [`config`]: Container configuration (block size, compaction cadence)
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! OxiFS is layered the same way as an archiver protocol stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: CLI                                                 │
//! │     oxifs binary, interactive shell                     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container store                                     │
//! │     On-disk tree, sibling lists, compaction            │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     Per-block Huffman tree, encode/decode               │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Core (this crate)                                   │
//! │     BitStack, BlockChecksum, ContainerConfig            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxifs_core::bitstream::BitStack;
//! use oxifs_core::checksum::BlockChecksum;
//!
//! let mut bits = BitStack::new();
//! bits.push(true);
//! bits.push(false);
//! assert_eq!(bits.to_packed_bytes(), vec![0b0100_0000]);
//!
//! let crc = BlockChecksum::compute(b"123456789");
//! assert_eq!(crc, 0x02AB_DB54);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![forbid(unsafe_code)]

pub mod bitstream;
pub mod checksum;
pub mod config;
pub mod error;

// Re-exports for convenience
pub use bitstream::BitStack;
pub use checksum::BlockChecksum;
pub use config::{BLOCK_SIZE, ContainerConfig, DELETES_COUNT_FOR_DEFRAGMENTATION};
pub use error::{EntryKind, OxiFsError, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::BitStack;
    pub use crate::checksum::BlockChecksum;
    pub use crate::config::ContainerConfig;
    pub use crate::error::{EntryKind, OxiFsError, Result};
}
