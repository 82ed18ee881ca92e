//! Block records.
//!
//! File content is split into fixed-size chunks. Each chunk is stored as a
//! self-contained record with its own Huffman tree:
//!
//! ```text
//! [checksum:4][uncompressedLen:4][treeLen:4][tree bytes][encodedLen:4][encoded bytes]
//! ```
//!
//! The checksum covers the uncompressed chunk, so a record is only trusted
//! after it has been decoded and the checksum recomputed.

use oxifs_core::checksum::BlockChecksum;
use oxifs_core::config::MAX_BLOCK_SIZE;
use oxifs_core::error::{OxiFsError, Result};
use oxifs_huffman::{BYTE_VALUES, HuffmanTree};
use std::io::{Read, Seek, SeekFrom};

/// Fixed bytes of a block record besides the tree and encoded payloads.
pub const BLOCK_OVERHEAD: usize = 16;

/// Longest serialized tree: one flag/value pair per node of a full tree.
pub const MAX_TREE_LEN: usize = 2 * (2 * BYTE_VALUES - 1);

/// A block record held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecord {
    /// Checksum of the uncompressed chunk.
    pub checksum: u32,
    /// Length of the uncompressed chunk.
    pub uncompressed_len: u32,
    /// Serialized Huffman tree.
    pub tree_bytes: Vec<u8>,
    /// Packed Huffman bits.
    pub encoded_bytes: Vec<u8>,
}

impl BlockRecord {
    /// Compress one chunk of file content.
    pub fn compress(chunk: &[u8]) -> Result<Self> {
        let tree = HuffmanTree::build(chunk);
        let encoded_bytes = tree.encode(chunk)?;
        Ok(Self {
            checksum: BlockChecksum::compute(chunk),
            uncompressed_len: chunk.len() as u32,
            tree_bytes: tree.to_bytes(),
            encoded_bytes,
        })
    }

    /// Length of the record on disk.
    pub fn record_len(&self) -> usize {
        BLOCK_OVERHEAD + self.tree_bytes.len() + self.encoded_bytes.len()
    }

    /// Append the on-disk form of the record.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.checksum.to_le_bytes());
        out.extend_from_slice(&self.uncompressed_len.to_le_bytes());
        out.extend_from_slice(&(self.tree_bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.tree_bytes);
        out.extend_from_slice(&(self.encoded_bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.encoded_bytes);
    }

    /// Read the record at `offset`, returning it with the offset of the next record.
    pub fn read<R: Read + Seek>(reader: &mut R, offset: u64, end: u64) -> Result<(Self, u64)> {
        let location = BlockLocation::read(reader, offset, end)?;

        let mut tree_bytes = vec![0u8; location.tree_len as usize];
        reader.seek(SeekFrom::Start(location.tree_offset))?;
        reader.read_exact(&mut tree_bytes)?;

        let mut encoded_bytes = vec![0u8; location.encoded_len as usize];
        reader.seek(SeekFrom::Start(location.encoded_offset))?;
        reader.read_exact(&mut encoded_bytes)?;

        let record = Self {
            checksum: location.checksum,
            uncompressed_len: location.uncompressed_len,
            tree_bytes,
            encoded_bytes,
        };
        Ok((record, location.next_offset))
    }

    /// Decode the chunk without checking the checksum.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let tree = HuffmanTree::from_bytes(&self.tree_bytes)?;
        tree.decode(&self.encoded_bytes, self.uncompressed_len as usize)
    }

    /// Decode the chunk and verify it against the stored checksum.
    ///
    /// `offset` is only used to locate the fault in the error.
    pub fn decode_verified(&self, offset: u64) -> Result<Vec<u8>> {
        let data = self.decode()?;
        let computed = BlockChecksum::compute(&data);
        if computed != self.checksum {
            return Err(OxiFsError::checksum_mismatch(offset, self.checksum, computed));
        }
        Ok(data)
    }
}

/// Position and header fields of a block record on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLocation {
    /// Offset of the record.
    pub offset: u64,
    /// Stored checksum.
    pub checksum: u32,
    /// Stored uncompressed length.
    pub uncompressed_len: u32,
    /// Offset of the serialized tree.
    pub tree_offset: u64,
    /// Length of the serialized tree.
    pub tree_len: u32,
    /// Offset of the encoded bits.
    pub encoded_offset: u64,
    /// Length of the encoded bits.
    pub encoded_len: u32,
    /// Offset just past the record.
    pub next_offset: u64,
}

impl BlockLocation {
    /// Read and bounds-check the header fields of the record at `offset`.
    pub fn read<R: Read + Seek>(reader: &mut R, offset: u64, end: u64) -> Result<Self> {
        let out_of_range =
            || OxiFsError::corrupted(offset, "block record extends past container end");

        if offset + 12 > end {
            return Err(out_of_range());
        }
        reader.seek(SeekFrom::Start(offset))?;
        let mut head = [0u8; 12];
        reader.read_exact(&mut head)?;
        let checksum = u32::from_le_bytes([head[0], head[1], head[2], head[3]]);
        let uncompressed_len = u32::from_le_bytes([head[4], head[5], head[6], head[7]]);
        let tree_len = u32::from_le_bytes([head[8], head[9], head[10], head[11]]);

        if uncompressed_len as usize > MAX_BLOCK_SIZE {
            return Err(OxiFsError::corrupted(
                offset,
                format!("block length {uncompressed_len} exceeds limit"),
            ));
        }
        if tree_len as usize > MAX_TREE_LEN {
            return Err(OxiFsError::malformed_tree(format!(
                "tree of {tree_len} bytes at offset {offset}"
            )));
        }

        let tree_offset = offset + 12;
        let encoded_len_at = tree_offset + tree_len as u64;
        if encoded_len_at + 4 > end {
            return Err(out_of_range());
        }
        reader.seek(SeekFrom::Start(encoded_len_at))?;
        let mut len = [0u8; 4];
        reader.read_exact(&mut len)?;
        let encoded_len = u32::from_le_bytes(len);

        let encoded_offset = encoded_len_at + 4;
        let next_offset = encoded_offset + encoded_len as u64;
        if next_offset > end {
            return Err(out_of_range());
        }

        Ok(Self {
            offset,
            checksum,
            uncompressed_len,
            tree_offset,
            tree_len,
            encoded_offset,
            encoded_len,
            next_offset,
        })
    }
}

/// Split `data` into `block_size` chunks and compress each one.
///
/// Empty input yields no blocks.
#[cfg(not(feature = "parallel"))]
pub fn compress_blocks(data: &[u8], block_size: usize) -> Result<Vec<BlockRecord>> {
    data.chunks(block_size).map(BlockRecord::compress).collect()
}

/// Split `data` into `block_size` chunks and compress them in parallel.
///
/// Empty input yields no blocks. Record order matches chunk order.
#[cfg(feature = "parallel")]
pub fn compress_blocks(data: &[u8], block_size: usize) -> Result<Vec<BlockRecord>> {
    use rayon::prelude::*;

    data.par_chunks(block_size).map(BlockRecord::compress).collect()
}
