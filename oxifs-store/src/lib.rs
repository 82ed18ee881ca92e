//! # OxiFS Store
//!
//! A whole directory tree stored in one host file.
//!
//! - [`layout`]: record formats and field positions
//! - [`siblings`]: the doubly linked child lists every directory owns
//! - [`block`]: self-contained compressed block records
//! - [`container`]: the open container with its current-directory cursor
//! - [`compact`]: rewriting the container without dead records
//!
//! Files are split into blocks, each compressed with its own Huffman tree
//! and protected by a checksum. Removal only unlinks records; after a
//! configurable number of removals the container is compacted.
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxifs_store::Container;
//!
//! let mut fs = Container::open("disk.oxifs").unwrap();
//! fs.make_directory("docs").unwrap();
//! fs.change_directory("docs").unwrap();
//! fs.add_file("hello.txt", b"Hello, World!").unwrap();
//!
//! let data = fs.export_file("hello.txt").unwrap();
//! assert_eq!(data, b"Hello, World!");
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel`: compress the blocks of one file on the rayon thread pool

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![forbid(unsafe_code)]

pub mod block;
pub mod compact;
pub mod container;
pub mod layout;
pub mod siblings;
mod transfer;

// Re-exports
pub use block::{BlockLocation, BlockRecord, compress_blocks};
pub use compact::CompactionStats;
pub use container::{Container, DirectoryListing, DirectoryTarget, Entry, FileCheck};
pub use layout::{DirectoryNode, FileNode, MAX_NAME_LEN, ROOT_NAME, ROOT_OFFSET};
pub use siblings::SiblingKind;
