//! On-disk record layout.
//!
//! A container is one flat file. All integers are little-endian and 4 bytes
//! wide. Offsets are absolute positions in the container, stored as signed
//! values where `-1` means "no node".
//!
//! ```text
//! Header           [deletesCount:4]
//! DirectoryNode    [parent:4][prev:4][next:4][size:4][firstDir:4][firstFile:4][name]
//! FileNode         [parent:4][prev:4][next:4][blocks:4][contentLen:4][name][blocks...]
//! Name             [byteLen: 7-bit varint][UTF-8 bytes]
//! ```
//!
//! The root directory always sits right after the header, at [`ROOT_OFFSET`].
//! Node views are transient: every read materializes a fresh struct from disk.

use oxifs_core::error::{OxiFsError, Result};
use std::io::{Read, Seek, SeekFrom, Write};

/// Length of the container header.
pub const HEADER_LEN: u64 = 4;

/// Offset of the root directory record.
pub const ROOT_OFFSET: u32 = HEADER_LEN as u32;

/// Name of the root directory.
pub const ROOT_NAME: &str = "/";

/// On-disk value of an absent link.
pub const NO_LINK: i32 = -1;

/// Longest accepted name, in UTF-8 bytes.
pub const MAX_NAME_LEN: usize = 255;

/// Largest offset or length representable in a signed 32-bit field.
pub const MAX_CONTAINER_LEN: u64 = i32::MAX as u64;

/// Field positions relative to the start of a node record.
pub mod field {
    /// Parent directory link (both node kinds).
    pub const PARENT: u64 = 0;
    /// Previous sibling link (both node kinds).
    pub const PREV: u64 = 4;
    /// Next sibling link (both node kinds).
    pub const NEXT: u64 = 8;
    /// Directory: aggregate size of the subtree.
    pub const DIR_SIZE: u64 = 12;
    /// Directory: head of the child directory list.
    pub const FIRST_DIR: u64 = 16;
    /// Directory: head of the child file list.
    pub const FIRST_FILE: u64 = 20;
    /// Directory: start of the name.
    pub const DIR_NAME: u64 = 24;
    /// File: number of block records.
    pub const FILE_BLOCKS: u64 = 12;
    /// File: byte length of all block records.
    pub const FILE_CONTENT_LEN: u64 = 16;
    /// File: start of the name.
    pub const FILE_NAME: u64 = 20;
}

#[inline]
fn le_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn link_from_raw(raw: u32, at: u64) -> Result<Option<u32>> {
    match raw as i32 {
        NO_LINK => Ok(None),
        value if value < ROOT_OFFSET as i32 => Err(OxiFsError::corrupted(
            at,
            format!("link {value} points outside the node area"),
        )),
        value => Ok(Some(value as u32)),
    }
}

fn link_to_raw(link: Option<u32>) -> Result<i32> {
    match link {
        None => Ok(NO_LINK),
        Some(offset) => i32::try_from(offset).map_err(|_| OxiFsError::ContainerTooLarge {
            length: offset as u64,
        }),
    }
}

fn push_link(out: &mut Vec<u8>, link: Option<u32>) -> Result<()> {
    out.extend_from_slice(&link_to_raw(link)?.to_le_bytes());
    Ok(())
}

/// Read a 4-byte unsigned value at `pos`.
pub fn read_u32_at<R: Read + Seek>(reader: &mut R, pos: u64) -> Result<u32> {
    reader.seek(SeekFrom::Start(pos))?;
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Write a 4-byte unsigned value at `pos`.
pub fn write_u32_at<W: Write + Seek>(writer: &mut W, pos: u64, value: u32) -> Result<()> {
    writer.seek(SeekFrom::Start(pos))?;
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

/// Read a link field at `pos`.
pub fn read_link_at<R: Read + Seek>(reader: &mut R, pos: u64) -> Result<Option<u32>> {
    let raw = read_u32_at(reader, pos)?;
    link_from_raw(raw, pos)
}

/// Write a link field at `pos`.
pub fn write_link_at<W: Write + Seek>(writer: &mut W, pos: u64, link: Option<u32>) -> Result<()> {
    writer.seek(SeekFrom::Start(pos))?;
    writer.write_all(&link_to_raw(link)?.to_le_bytes())?;
    Ok(())
}

/// Reject names that cannot be stored or looked up.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(OxiFsError::invalid_name(name, "name is empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(OxiFsError::invalid_name(name, "name exceeds 255 bytes"));
    }
    if name == "." || name == ".." {
        return Err(OxiFsError::invalid_name(name, "name is reserved"));
    }
    if name.contains(['/', '\\']) {
        return Err(OxiFsError::invalid_name(name, "name contains a path separator"));
    }
    Ok(())
}

/// Append a length-prefixed name.
pub fn encode_name(name: &str, out: &mut Vec<u8>) {
    let mut len = name.len();
    loop {
        let byte = (len & 0x7F) as u8;
        len >>= 7;
        if len == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
    out.extend_from_slice(name.as_bytes());
}

/// Encoded length of a name including its prefix.
pub fn encoded_name_len(name: &str) -> usize {
    let mut prefix = 1;
    let mut len = name.len() >> 7;
    while len > 0 {
        prefix += 1;
        len >>= 7;
    }
    prefix + name.len()
}

/// Read a length-prefixed name from the current position.
pub fn read_name<R: Read>(reader: &mut R, at: u64) -> Result<String> {
    let mut len = 0usize;
    let mut shift = 0;
    loop {
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte)?;
        len |= ((byte[0] & 0x7F) as usize) << shift;
        if byte[0] & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift > 28 {
            return Err(OxiFsError::corrupted(at, "name length prefix too long"));
        }
    }
    if len > MAX_NAME_LEN {
        return Err(OxiFsError::corrupted(at, format!("name length {len} exceeds limit")));
    }

    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|_| OxiFsError::corrupted(at, "name is not valid UTF-8"))
}

/// Container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    /// Removals since the last compaction.
    pub deletes_count: u32,
}

impl Header {
    /// Read the header at offset 0.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            deletes_count: read_u32_at(reader, 0)?,
        })
    }

    /// Write the header at offset 0.
    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        write_u32_at(writer, 0, self.deletes_count)
    }
}

/// Transient view of a directory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    /// Offset of this record.
    pub offset: u32,
    /// Parent directory; `None` only for the root.
    pub parent: Option<u32>,
    /// Previous directory in the parent's directory list.
    pub prev: Option<u32>,
    /// Next directory in the parent's directory list.
    pub next: Option<u32>,
    /// Bytes charged to every file in this subtree.
    pub size: u32,
    /// Head of the child directory list.
    pub first_dir: Option<u32>,
    /// Head of the child file list.
    pub first_file: Option<u32>,
    /// Directory name.
    pub name: String,
}

impl DirectoryNode {
    /// Fixed part of the record, before the name.
    pub const FIXED_LEN: usize = 24;

    /// A fresh, empty directory record to be placed at `offset`.
    pub fn new(
        offset: u32,
        parent: Option<u32>,
        prev: Option<u32>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            offset,
            parent,
            prev,
            next: None,
            size: 0,
            first_dir: None,
            first_file: None,
            name: name.into(),
        }
    }

    /// Read the record at `offset`.
    pub fn read<R: Read + Seek>(reader: &mut R, offset: u32) -> Result<Self> {
        let at = offset as u64;
        reader.seek(SeekFrom::Start(at))?;
        let mut buf = [0u8; Self::FIXED_LEN];
        reader.read_exact(&mut buf)?;

        Ok(Self {
            offset,
            parent: link_from_raw(le_u32(&buf, 0), at + field::PARENT)?,
            prev: link_from_raw(le_u32(&buf, 4), at + field::PREV)?,
            next: link_from_raw(le_u32(&buf, 8), at + field::NEXT)?,
            size: le_u32(&buf, 12),
            first_dir: link_from_raw(le_u32(&buf, 16), at + field::FIRST_DIR)?,
            first_file: link_from_raw(le_u32(&buf, 20), at + field::FIRST_FILE)?,
            name: read_name(reader, at + field::DIR_NAME)?,
        })
    }

    /// Serialize the record (without its offset).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.record_len());
        push_link(&mut out, self.parent)?;
        push_link(&mut out, self.prev)?;
        push_link(&mut out, self.next)?;
        out.extend_from_slice(&self.size.to_le_bytes());
        push_link(&mut out, self.first_dir)?;
        push_link(&mut out, self.first_file)?;
        encode_name(&self.name, &mut out);
        Ok(out)
    }

    /// Total record length.
    pub fn record_len(&self) -> usize {
        Self::FIXED_LEN + encoded_name_len(&self.name)
    }

    /// True for the root directory.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// True when the directory has no live children.
    pub fn is_empty(&self) -> bool {
        self.first_dir.is_none() && self.first_file.is_none()
    }
}

/// Transient view of a file record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// Offset of this record.
    pub offset: u32,
    /// Containing directory.
    pub parent: u32,
    /// Previous file in the parent's file list.
    pub prev: Option<u32>,
    /// Next file in the parent's file list.
    pub next: Option<u32>,
    /// Number of block records.
    pub blocks_count: u32,
    /// Byte length of all block records.
    pub content_len: u32,
    /// File name.
    pub name: String,
}

impl FileNode {
    /// Fixed part of the record, before the name.
    pub const FIXED_LEN: usize = 20;

    /// Read the record at `offset`.
    pub fn read<R: Read + Seek>(reader: &mut R, offset: u32) -> Result<Self> {
        let at = offset as u64;
        reader.seek(SeekFrom::Start(at))?;
        let mut buf = [0u8; Self::FIXED_LEN];
        reader.read_exact(&mut buf)?;

        let parent = link_from_raw(le_u32(&buf, 0), at + field::PARENT)?
            .ok_or_else(|| OxiFsError::corrupted(at, "file record without parent"))?;

        Ok(Self {
            offset,
            parent,
            prev: link_from_raw(le_u32(&buf, 4), at + field::PREV)?,
            next: link_from_raw(le_u32(&buf, 8), at + field::NEXT)?,
            blocks_count: le_u32(&buf, 12),
            content_len: le_u32(&buf, 16),
            name: read_name(reader, at + field::FILE_NAME)?,
        })
    }

    /// Serialize the record header and name (block records follow separately).
    pub fn header_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.header_len());
        push_link(&mut out, Some(self.parent))?;
        push_link(&mut out, self.prev)?;
        push_link(&mut out, self.next)?;
        out.extend_from_slice(&self.blocks_count.to_le_bytes());
        out.extend_from_slice(&self.content_len.to_le_bytes());
        encode_name(&self.name, &mut out);
        Ok(out)
    }

    /// Length of the header and name.
    pub fn header_len(&self) -> usize {
        Self::FIXED_LEN + encoded_name_len(&self.name)
    }

    /// Offset of the first block record.
    pub fn content_offset(&self) -> u64 {
        self.offset as u64 + self.header_len() as u64
    }

    /// Offset just past the last block record.
    pub fn end_offset(&self) -> u64 {
        self.content_offset() + self.content_len as u64
    }
}
