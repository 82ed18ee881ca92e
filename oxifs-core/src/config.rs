//! Container configuration.

use crate::error::{OxiFsError, Result};

/// Bytes of file content per block record.
pub const BLOCK_SIZE: usize = 1024;

/// Number of removals after which the container is compacted.
pub const DELETES_COUNT_FOR_DEFRAGMENTATION: u32 = 5;

/// Largest accepted block size.
///
/// Block lengths are stored as 32-bit values and a block is compressed in
/// memory as a whole, so anything beyond a few megabytes is a mistake.
pub const MAX_BLOCK_SIZE: usize = 1 << 22;

/// Container configuration parameters.
///
/// Nothing here is persisted in the container. A container must be reopened
/// with the same `block_size` it was written with, otherwise directory sizes
/// (which are charged per whole block) stop matching new imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Bytes of content per block; the last block of a file may be shorter.
    pub block_size: usize,
    /// Removals between automatic compactions.
    pub compaction_threshold: u32,
    /// Call `sync_data` after every mutating operation, not just `flush`.
    pub sync_writes: bool,
}

impl ContainerConfig {
    /// Default configuration: 1 KiB blocks, compaction every 5 removals.
    pub const DEFAULT: Self = Self {
        block_size: BLOCK_SIZE,
        compaction_threshold: DELETES_COUNT_FOR_DEFRAGMENTATION,
        sync_writes: false,
    };

    /// Create the default configuration.
    pub fn new() -> Self {
        Self::DEFAULT
    }

    /// Set the block size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the number of removals between compactions.
    pub fn with_compaction_threshold(mut self, threshold: u32) -> Self {
        self.compaction_threshold = threshold;
        self
    }

    /// Enable or disable `sync_data` after writes.
    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    /// Size charged to directories for a file of `blocks_count` blocks.
    pub fn charged_size(&self, blocks_count: u32) -> u64 {
        blocks_count as u64 * self.block_size as u64
    }

    /// Check that every value is in range.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(OxiFsError::invalid_config(format!(
                "block size {} outside 1..={}",
                self.block_size, MAX_BLOCK_SIZE
            )));
        }
        if self.compaction_threshold == 0 {
            return Err(OxiFsError::invalid_config(
                "compaction threshold must be at least 1",
            ));
        }
        Ok(())
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
