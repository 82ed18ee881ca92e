//! Compaction.
//!
//! Removal only unlinks records, so dead bytes accumulate. Compaction copies
//! every reachable record into a fresh image, depth first: a directory
//! record, then its files (block records copied verbatim), then its child
//! directories. Sibling order and directory sizes are preserved.

use crate::layout::{DirectoryNode, FileNode, HEADER_LEN, Header, MAX_CONTAINER_LEN, ROOT_OFFSET};
use crate::siblings::{self, SiblingKind};
use oxifs_core::error::{OxiFsError, Result};
use std::collections::HashSet;
use std::io::{Read, Seek, SeekFrom, Write};

/// Counters reported by a compaction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactionStats {
    /// Container length before compaction.
    pub bytes_before: u64,
    /// Container length after compaction.
    pub bytes_after: u64,
    /// Directories copied, root included.
    pub directories: usize,
    /// Files copied.
    pub files: usize,
}

impl CompactionStats {
    /// Bytes freed by the run.
    pub fn reclaimed(&self) -> u64 {
        self.bytes_before.saturating_sub(self.bytes_after)
    }
}

/// Copies the live tree from `source` into an empty `target`.
pub(crate) struct Compactor<'a, R, W> {
    source: &'a mut R,
    source_end: u64,
    target: &'a mut W,
    target_end: u64,
    old_cursor: u32,
    new_cursor: Option<u32>,
    visited: HashSet<u32>,
    stats: CompactionStats,
}

impl<'a, R: Read + Seek, W: Write + Seek> Compactor<'a, R, W> {
    pub(crate) fn new(
        source: &'a mut R,
        source_end: u64,
        target: &'a mut W,
        old_cursor: u32,
    ) -> Self {
        Self {
            source,
            source_end,
            target,
            target_end: 0,
            old_cursor,
            new_cursor: None,
            visited: HashSet::new(),
            stats: CompactionStats {
                bytes_before: source_end,
                ..CompactionStats::default()
            },
        }
    }

    /// Copy everything, returning the relocated cursor (if still reachable).
    pub(crate) fn run(mut self) -> Result<(Option<u32>, CompactionStats)> {
        Header::default().write(self.target)?;
        self.target_end = HEADER_LEN;
        self.copy_directory(ROOT_OFFSET, None, None)?;
        self.stats.bytes_after = self.target_end;
        Ok((self.new_cursor, self.stats))
    }

    fn append(&mut self, bytes: &[u8]) -> Result<u32> {
        let offset = self.target_end;
        let end = offset + bytes.len() as u64;
        if end > MAX_CONTAINER_LEN {
            return Err(OxiFsError::ContainerTooLarge { length: end });
        }
        self.target.seek(SeekFrom::Start(offset))?;
        self.target.write_all(bytes)?;
        self.target_end = end;
        Ok(offset as u32)
    }

    fn copy_directory(&mut self, old: u32, parent: Option<u32>, prev: Option<u32>) -> Result<u32> {
        siblings::check_node_offset(old, self.source_end)?;
        if !self.visited.insert(old) {
            return Err(OxiFsError::corrupted(old as u64, "directory reachable twice"));
        }
        let dir = DirectoryNode::read(self.source, old)?;

        let mut copy = DirectoryNode::new(self.target_end as u32, parent, prev, dir.name.as_str());
        copy.size = dir.size;
        let offset = self.append(&copy.to_bytes()?)?;
        if let Some(parent) = parent {
            siblings::link_tail(self.target, parent, SiblingKind::Directory, prev, offset)?;
        }
        if old == self.old_cursor {
            self.new_cursor = Some(offset);
        }
        self.stats.directories += 1;

        let mut prev_file = None;
        for file_offset in siblings::collect(self.source, dir.first_file, self.source_end)? {
            prev_file = Some(self.copy_file(file_offset, offset, prev_file)?);
        }

        let mut prev_dir = None;
        for child in siblings::collect(self.source, dir.first_dir, self.source_end)? {
            prev_dir = Some(self.copy_directory(child, Some(offset), prev_dir)?);
        }

        Ok(offset)
    }

    fn copy_file(&mut self, old: u32, parent: u32, prev: Option<u32>) -> Result<u32> {
        let file = FileNode::read(self.source, old)?;
        if file.end_offset() > self.source_end {
            return Err(OxiFsError::corrupted(
                old as u64,
                "file content extends past container end",
            ));
        }

        let mut content = vec![0u8; file.content_len as usize];
        self.source.seek(SeekFrom::Start(file.content_offset()))?;
        self.source.read_exact(&mut content)?;

        let copy = FileNode {
            offset: self.target_end as u32,
            parent,
            prev,
            next: None,
            ..file
        };
        let offset = self.append(&copy.header_bytes()?)?;
        self.append(&content)?;
        siblings::link_tail(self.target, parent, SiblingKind::File, prev, offset)?;
        self.stats.files += 1;
        Ok(offset)
    }
}
