//! The container: one host file holding a directory tree of compressed files.

use crate::block::{self, BlockLocation, BlockRecord};
use crate::compact::{CompactionStats, Compactor};
use crate::layout::{
    self, DirectoryNode, FileNode, Header, MAX_CONTAINER_LEN, ROOT_NAME, ROOT_OFFSET, field,
};
use crate::siblings::{self, SiblingKind};
use oxifs_core::config::ContainerConfig;
use oxifs_core::error::{EntryKind, OxiFsError, Result};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where `change_directory` should move the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryTarget<'a> {
    /// The root directory.
    Root,
    /// The parent of the current directory; stays put at the root.
    Parent,
    /// A child directory of the current directory, by name.
    Named(&'a str),
}

impl<'a> DirectoryTarget<'a> {
    /// Interpret a shell-style argument: `\` or `/` is the root, `..` the parent.
    pub fn parse(target: &'a str) -> Self {
        match target {
            "\\" | "/" => Self::Root,
            ".." => Self::Parent,
            name => Self::Named(name),
        }
    }
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry name.
    pub name: String,
    /// File or directory.
    pub kind: EntryKind,
    /// Offset of the node record.
    pub offset: u32,
    /// Charged size: whole blocks for a file, the subtree total for a directory.
    pub size: u64,
}

/// Contents of one directory, each list in on-disk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    /// Child files.
    pub files: Vec<Entry>,
    /// Child directories.
    pub directories: Vec<Entry>,
}

/// Outcome of verifying one file.
#[derive(Debug)]
pub struct FileCheck {
    /// Path of the file from the root.
    pub path: String,
    /// Offset of the file record.
    pub offset: u32,
    /// Number of block records.
    pub blocks: u32,
    /// First fault found, if any.
    pub error: Option<OxiFsError>,
}

impl FileCheck {
    /// True when every block decoded and matched its checksum.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// An open container.
///
/// The container keeps a cursor on the current directory. Name-based
/// operations resolve names against that directory only.
#[derive(Debug)]
pub struct Container {
    file: File,
    path: PathBuf,
    config: ContainerConfig,
    cursor: u32,
    deletes_count: u32,
}

impl Container {
    /// Open the container at `path`, creating it when it does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, ContainerConfig::default())
    }

    /// Open or create a container with explicit configuration.
    pub fn open_with_config(path: impl AsRef<Path>, config: ContainerConfig) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let len = file.seek(SeekFrom::End(0))?;
        let deletes_count = if len == 0 {
            Self::initialize(&mut file)?;
            info!(path = %path.display(), "created container");
            0
        } else {
            Self::check_root(&mut file, len)?;
            Header::read(&mut file)?.deletes_count
        };

        debug!(path = %path.display(), deletes_count, "opened container");
        Ok(Self {
            file,
            path,
            config,
            cursor: ROOT_OFFSET,
            deletes_count,
        })
    }

    fn initialize(file: &mut File) -> Result<()> {
        let mut image = Vec::new();
        image.extend_from_slice(&0u32.to_le_bytes());
        let root = DirectoryNode::new(ROOT_OFFSET, None, None, ROOT_NAME);
        image.extend_from_slice(&root.to_bytes()?);
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&image)?;
        file.flush()?;
        Ok(())
    }

    fn check_root(file: &mut File, len: u64) -> Result<()> {
        if len < ROOT_OFFSET as u64 + DirectoryNode::FIXED_LEN as u64 {
            return Err(OxiFsError::corrupted(0, format!("container of {len} bytes has no root")));
        }
        let root = DirectoryNode::read(file, ROOT_OFFSET)?;
        if !root.is_root() {
            return Err(OxiFsError::corrupted(ROOT_OFFSET as u64, "root directory has a parent"));
        }
        Ok(())
    }

    /// Path of the host file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Active configuration.
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Removals since the last compaction.
    pub fn deletes_count(&self) -> u32 {
        self.deletes_count
    }

    /// Offset of the current directory.
    pub fn current_directory_offset(&self) -> u32 {
        self.cursor
    }

    /// Length of the host file.
    pub fn len(&mut self) -> Result<u64> {
        Ok(self.file.seek(SeekFrom::End(0))?)
    }

    /// True when the container holds nothing but the root directory.
    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.get_directory_node(ROOT_OFFSET)?.is_empty())
    }

    // Node access

    /// Read the directory record at `offset`.
    pub fn get_directory_node(&mut self, offset: u32) -> Result<DirectoryNode> {
        let end = self.len()?;
        siblings::check_node_offset(offset, end)?;
        DirectoryNode::read(&mut self.file, offset)
    }

    /// Read the file record at `offset`.
    pub fn get_file_node(&mut self, offset: u32) -> Result<FileNode> {
        let end = self.len()?;
        siblings::check_node_offset(offset, end)?;
        let node = FileNode::read(&mut self.file, offset)?;
        if node.end_offset() > end {
            return Err(OxiFsError::corrupted(
                offset as u64,
                "file content extends past container end",
            ));
        }
        Ok(node)
    }

    /// The current directory.
    pub fn current_directory(&mut self) -> Result<DirectoryNode> {
        self.get_directory_node(self.cursor)
    }

    /// Child directories of `dir`, in list order.
    pub fn child_directories(&mut self, dir: &DirectoryNode) -> Result<Vec<DirectoryNode>> {
        let end = self.len()?;
        siblings::collect(&mut self.file, dir.first_dir, end)?
            .into_iter()
            .map(|offset| DirectoryNode::read(&mut self.file, offset))
            .collect()
    }

    /// Child files of `dir`, in list order.
    pub fn child_files(&mut self, dir: &DirectoryNode) -> Result<Vec<FileNode>> {
        let end = self.len()?;
        siblings::collect(&mut self.file, dir.first_file, end)?
            .into_iter()
            .map(|offset| self.get_file_node(offset))
            .collect()
    }

    /// First file named `name` in the current directory.
    pub fn find_file(&mut self, name: &str) -> Result<FileNode> {
        let dir = self.current_directory()?;
        self.child_files(&dir)?
            .into_iter()
            .find(|file| file.name == name)
            .ok_or_else(|| OxiFsError::not_found(EntryKind::File, name))
    }

    /// First directory named `name` in the current directory.
    pub fn find_directory(&mut self, name: &str) -> Result<DirectoryNode> {
        let dir = self.current_directory()?;
        self.child_directories(&dir)?
            .into_iter()
            .find(|child| child.name == name)
            .ok_or_else(|| OxiFsError::not_found(EntryKind::Directory, name))
    }

    /// List the current directory.
    pub fn list(&mut self) -> Result<DirectoryListing> {
        let dir = self.current_directory()?;
        let files = self
            .child_files(&dir)?
            .into_iter()
            .map(|file| Entry {
                size: self.config.charged_size(file.blocks_count),
                name: file.name,
                kind: EntryKind::File,
                offset: file.offset,
            })
            .collect();
        let directories = self
            .child_directories(&dir)?
            .into_iter()
            .map(|child| Entry {
                size: child.size as u64,
                name: child.name,
                kind: EntryKind::Directory,
                offset: child.offset,
            })
            .collect();
        Ok(DirectoryListing { files, directories })
    }

    /// Absolute path of the current directory, `/` for the root.
    pub fn current_path(&mut self) -> Result<String> {
        self.path_of(self.cursor)
    }

    fn path_of(&mut self, offset: u32) -> Result<String> {
        let mut names = Vec::new();
        for dir in self.ancestry(offset)? {
            if !dir.is_root() {
                names.push(dir.name);
            }
        }
        names.reverse();
        Ok(format!("/{}", names.join("/")))
    }

    /// `offset` and all its ancestors, nearest first.
    fn ancestry(&mut self, offset: u32) -> Result<Vec<DirectoryNode>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(offset);
        while let Some(offset) = current {
            if !seen.insert(offset) {
                return Err(OxiFsError::corrupted(offset as u64, "parent chain loops"));
            }
            let dir = self.get_directory_node(offset)?;
            current = dir.parent;
            chain.push(dir);
        }
        Ok(chain)
    }

    // Navigation

    /// Move the cursor; see [`DirectoryTarget::parse`] for the argument syntax.
    pub fn change_directory(&mut self, target: &str) -> Result<()> {
        self.change_directory_to(DirectoryTarget::parse(target))
    }

    /// Move the cursor to `target`. A failed lookup leaves the cursor in place.
    pub fn change_directory_to(&mut self, target: DirectoryTarget<'_>) -> Result<()> {
        self.cursor = match target {
            DirectoryTarget::Root => ROOT_OFFSET,
            DirectoryTarget::Parent => self.current_directory()?.parent.unwrap_or(ROOT_OFFSET),
            DirectoryTarget::Named(name) => self.find_directory(name)?.offset,
        };
        debug!(cursor = self.cursor, "changed directory");
        Ok(())
    }

    /// Walk a slash-separated path. A leading separator starts at the root.
    ///
    /// On failure the cursor is restored to where it was.
    pub fn change_directory_path(&mut self, path: &str) -> Result<()> {
        let saved = self.cursor;
        let result = self.walk_path(path);
        if result.is_err() {
            self.cursor = saved;
        }
        result
    }

    fn walk_path(&mut self, path: &str) -> Result<()> {
        if path.starts_with(['/', '\\']) {
            self.cursor = ROOT_OFFSET;
        }
        for component in path.split(['/', '\\']) {
            match component {
                "" | "." => {}
                ".." => self.change_directory_to(DirectoryTarget::Parent)?,
                name => self.change_directory_to(DirectoryTarget::Named(name))?,
            }
        }
        Ok(())
    }

    // Mutation

    /// Compress `data` and append it as a new file in the current directory.
    pub fn add_file(&mut self, name: &str, data: &[u8]) -> Result<FileNode> {
        layout::validate_name(name)?;
        let blocks = block::compress_blocks(data, self.config.block_size)?;

        let content_len: usize = blocks.iter().map(BlockRecord::record_len).sum();
        let content_len = u32::try_from(content_len).map_err(|_| OxiFsError::ContainerTooLarge {
            length: content_len as u64,
        })?;
        let blocks_count = u32::try_from(blocks.len()).map_err(|_| OxiFsError::ContainerTooLarge {
            length: data.len() as u64,
        })?;

        let end = self.len()?;
        let parent = self.cursor;
        let prev = siblings::tail(&mut self.file, parent, SiblingKind::File, end)?;
        let node = FileNode {
            offset: Self::append_offset(end)?,
            parent,
            prev,
            next: None,
            blocks_count,
            content_len,
            name: name.to_string(),
        };
        Self::check_fits(node.end_offset())?;

        let mut record = node.header_bytes()?;
        record.reserve(content_len as usize);
        for block in &blocks {
            block.write_to(&mut record);
        }
        self.file.seek(SeekFrom::Start(end))?;
        self.file.write_all(&record)?;

        siblings::link_tail(&mut self.file, parent, SiblingKind::File, prev, node.offset)?;
        let charged = self.config.charged_size(blocks_count) as i64;
        self.propagate_size(parent, charged)?;
        self.finish_write()?;

        debug!(name, offset = node.offset, blocks = blocks_count, bytes = data.len(), "added file");
        Ok(node)
    }

    /// Create an empty directory in the current directory.
    pub fn make_directory(&mut self, name: &str) -> Result<DirectoryNode> {
        layout::validate_name(name)?;
        let end = self.len()?;
        let parent = self.cursor;
        let prev = siblings::tail(&mut self.file, parent, SiblingKind::Directory, end)?;
        let node = DirectoryNode::new(Self::append_offset(end)?, Some(parent), prev, name);
        Self::check_fits(end + node.record_len() as u64)?;

        self.file.seek(SeekFrom::Start(end))?;
        self.file.write_all(&node.to_bytes()?)?;
        siblings::link_tail(&mut self.file, parent, SiblingKind::Directory, prev, node.offset)?;
        self.finish_write()?;

        debug!(name, offset = node.offset, "created directory");
        Ok(node)
    }

    /// Remove the first file named `name` from the current directory.
    pub fn remove_file(&mut self, name: &str) -> Result<()> {
        let file = self.find_file(name)?;
        self.remove_file_node(&file)
    }

    /// Unlink a file record. `file` must be a fresh view of a live file.
    pub fn remove_file_node(&mut self, file: &FileNode) -> Result<()> {
        siblings::unlink(&mut self.file, file.parent, SiblingKind::File, file.prev, file.next)?;
        let charged = self.config.charged_size(file.blocks_count) as i64;
        self.propagate_size(file.parent, -charged)?;
        debug!(name = %file.name, offset = file.offset, "removed file");
        self.record_deletion()
    }

    /// Remove the first directory named `name` from the current directory.
    ///
    /// The whole subtree becomes unreachable.
    pub fn remove_directory(&mut self, name: &str) -> Result<()> {
        let dir = self.find_directory(name)?;
        self.remove_directory_node(&dir)
    }

    /// Unlink a directory record and with it the whole subtree.
    ///
    /// When the cursor sits inside the removed subtree it moves to the
    /// removed directory's parent.
    pub fn remove_directory_node(&mut self, dir: &DirectoryNode) -> Result<()> {
        let Some(parent) = dir.parent else {
            return Err(OxiFsError::invalid_name(ROOT_NAME, "the root directory cannot be removed"));
        };

        let cursor_inside = self
            .ancestry(self.cursor)?
            .iter()
            .any(|ancestor| ancestor.offset == dir.offset);

        siblings::unlink(&mut self.file, parent, SiblingKind::Directory, dir.prev, dir.next)?;
        self.propagate_size(parent, -(dir.size as i64))?;
        if cursor_inside {
            self.cursor = parent;
        }
        debug!(name = %dir.name, offset = dir.offset, size = dir.size, "removed directory");
        self.record_deletion()
    }

    /// Add `delta` to the size of `start` and every ancestor up to the root.
    fn propagate_size(&mut self, start: u32, delta: i64) -> Result<()> {
        if delta == 0 {
            return Ok(());
        }
        let end = self.len()?;
        let mut seen = HashSet::new();
        let mut current = Some(start);

        while let Some(offset) = current {
            siblings::check_node_offset(offset, end)?;
            if !seen.insert(offset) {
                return Err(OxiFsError::corrupted(offset as u64, "parent chain loops"));
            }
            let at = offset as u64 + field::DIR_SIZE;
            let size = layout::read_u32_at(&mut self.file, at)? as i64 + delta;
            if size < 0 {
                return Err(OxiFsError::corrupted(at, "directory size would become negative"));
            }
            let size = u32::try_from(size).map_err(|_| OxiFsError::ContainerTooLarge {
                length: size as u64,
            })?;
            layout::write_u32_at(&mut self.file, at, size)?;
            current = layout::read_link_at(&mut self.file, offset as u64 + field::PARENT)?;
        }
        Ok(())
    }

    /// Persist the bumped removal counter, then compact once it reaches the
    /// threshold.
    ///
    /// The removal is already on disk when compaction runs, so a failed
    /// compaction is logged and the counter stays at or above the threshold;
    /// the next removal tries again.
    fn record_deletion(&mut self) -> Result<()> {
        self.deletes_count += 1;
        Header {
            deletes_count: self.deletes_count,
        }
        .write(&mut self.file)?;
        self.finish_write()?;

        if self.deletes_count >= self.config.compaction_threshold {
            if let Err(err) = self.compact() {
                warn!(error = %err, deletes = self.deletes_count, "compaction failed, will retry");
            }
        }
        Ok(())
    }

    fn append_offset(end: u64) -> Result<u32> {
        Self::check_fits(end)?;
        Ok(end as u32)
    }

    fn check_fits(length: u64) -> Result<()> {
        if length > MAX_CONTAINER_LEN {
            return Err(OxiFsError::ContainerTooLarge { length });
        }
        Ok(())
    }

    fn finish_write(&mut self) -> Result<()> {
        self.file.flush()?;
        if self.config.sync_writes {
            self.file.sync_data()?;
        }
        Ok(())
    }

    // Content

    /// Decode the block record at `offset` without checking its checksum.
    ///
    /// Returns the bytes and the offset of the following record.
    pub fn read_block(&mut self, offset: u64) -> Result<(Vec<u8>, u64)> {
        let end = self.len()?;
        let (record, next) = BlockRecord::read(&mut self.file, offset, end)?;
        Ok((record.decode()?, next))
    }

    /// Decode the block record at `offset` and verify its checksum.
    pub fn read_validated_block(&mut self, offset: u64) -> Result<(Vec<u8>, u64)> {
        let end = self.len()?;
        let (record, next) = BlockRecord::read(&mut self.file, offset, end)?;
        Ok((record.decode_verified(offset)?, next))
    }

    /// Locate every block record of `file`.
    pub fn block_locations(&mut self, file: &FileNode) -> Result<Vec<BlockLocation>> {
        let content_end = file.end_offset();
        let mut offset = file.content_offset();
        let mut locations = Vec::with_capacity(file.blocks_count as usize);

        for _ in 0..file.blocks_count {
            let location = BlockLocation::read(&mut self.file, offset, content_end)?;
            offset = location.next_offset;
            locations.push(location);
        }
        if offset != content_end {
            return Err(OxiFsError::corrupted(
                file.offset as u64,
                format!("blocks end at {offset}, content length says {content_end}"),
            ));
        }
        Ok(locations)
    }

    /// Feed each verified block of `file` to `sink`, in order.
    pub fn read_blocks_with<F>(&mut self, file: &FileNode, mut sink: F) -> Result<()>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        let content_end = file.end_offset();
        for location in self.block_locations(file)? {
            let (record, _) = BlockRecord::read(&mut self.file, location.offset, content_end)?;
            match record.decode_verified(location.offset) {
                Ok(chunk) => sink(&chunk)?,
                Err(err) => {
                    warn!(
                        name = %file.name,
                        offset = location.offset,
                        error = %err,
                        "corrupted block"
                    );
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Decode and verify the whole content of `file`.
    pub fn read_file(&mut self, file: &FileNode) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(file.blocks_count as usize * self.config.block_size);
        self.read_blocks_with(file, |chunk| {
            data.extend_from_slice(chunk);
            Ok(())
        })?;
        Ok(data)
    }

    /// Decode and verify the file named `name` in the current directory.
    pub fn export_file(&mut self, name: &str) -> Result<Vec<u8>> {
        let file = self.find_file(name)?;
        self.read_file(&file)
    }

    /// Check every block of the file named `name` against its checksum.
    pub fn verify_file(&mut self, name: &str) -> Result<()> {
        let file = self.find_file(name)?;
        self.verify_file_node(&file)
    }

    /// Check every block of `file` against its checksum.
    pub fn verify_file_node(&mut self, file: &FileNode) -> Result<()> {
        self.read_blocks_with(file, |_| Ok(()))
    }

    /// Verify every file below the current directory.
    ///
    /// Broken directory chains abort the walk; faults inside a file are
    /// collected into its [`FileCheck`].
    pub fn verify_tree(&mut self) -> Result<Vec<FileCheck>> {
        let mut checks = Vec::new();
        let mut pending = vec![self.cursor];

        while let Some(offset) = pending.pop() {
            let dir = self.get_directory_node(offset)?;
            let prefix = self.path_of(offset)?;
            for file in self.child_files(&dir)? {
                let path = if prefix == "/" {
                    format!("/{}", file.name)
                } else {
                    format!("{prefix}/{}", file.name)
                };
                let error = self.verify_file_node(&file).err();
                checks.push(FileCheck {
                    path,
                    offset: file.offset,
                    blocks: file.blocks_count,
                    error,
                });
            }
            let children = self.child_directories(&dir)?;
            pending.extend(children.iter().rev().map(|child| child.offset));
        }
        Ok(checks)
    }

    // Compaction

    /// Rewrite the container with only live records and swap it in.
    ///
    /// Resets the removal counter. The cursor follows its directory; if the
    /// directory is no longer reachable the cursor returns to the root.
    pub fn compact(&mut self) -> Result<CompactionStats> {
        let staging = staging_path(&self.path);
        let source_end = self.len()?;
        info!(path = %self.path.display(), bytes = source_end, "compaction started");

        let mut target = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&staging)?;

        let outcome = Compactor::new(&mut self.file, source_end, &mut target, self.cursor).run();
        let outcome = outcome.and_then(|outcome| {
            target.flush()?;
            target.sync_all()?;
            fs::rename(&staging, &self.path)?;
            Ok(outcome)
        });
        let (cursor, stats) = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                drop(target);
                let _ = fs::remove_file(&staging);
                return Err(err);
            }
        };

        self.file = target;
        self.deletes_count = 0;
        self.cursor = match cursor {
            Some(cursor) => cursor,
            None => {
                warn!("current directory was not reachable, cursor moved to root");
                ROOT_OFFSET
            }
        };

        info!(
            before = stats.bytes_before,
            after = stats.bytes_after,
            directories = stats.directories,
            files = stats.files,
            "compaction ended"
        );
        Ok(stats)
    }
}

/// Sibling path used while compacting: `<container>.tmp`.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
