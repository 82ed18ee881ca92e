//! Doubly linked sibling lists.
//!
//! Every directory owns two lists: child directories (head at `firstDir`)
//! and child files (head at `firstFile`). Nodes of both kinds keep their
//! `prev`/`next` links at the same field positions, so one set of helpers
//! serves both lists.

use crate::layout::{self, ROOT_OFFSET, field};
use oxifs_core::error::{EntryKind, OxiFsError, Result};
use std::collections::HashSet;
use std::io::{Read, Seek, Write};

/// Which of a directory's two child lists to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiblingKind {
    /// The child directory list.
    Directory,
    /// The child file list.
    File,
}

impl SiblingKind {
    /// Position of this list's head link inside the parent record.
    pub fn head_field(self) -> u64 {
        match self {
            Self::Directory => field::FIRST_DIR,
            Self::File => field::FIRST_FILE,
        }
    }

    /// Entry kind stored in this list.
    pub fn entry_kind(self) -> EntryKind {
        match self {
            Self::Directory => EntryKind::Directory,
            Self::File => EntryKind::File,
        }
    }
}

/// Fail unless `offset` can hold a node record in a container of `end` bytes.
pub fn check_node_offset(offset: u32, end: u64) -> Result<()> {
    if offset < ROOT_OFFSET || offset as u64 >= end {
        return Err(OxiFsError::corrupted(
            offset as u64,
            format!("node offset outside container of {end} bytes"),
        ));
    }
    Ok(())
}

/// Read the head of one of `parent`'s child lists.
pub fn head<R: Read + Seek>(reader: &mut R, parent: u32, kind: SiblingKind) -> Result<Option<u32>> {
    layout::read_link_at(reader, parent as u64 + kind.head_field())
}

/// Collect the offsets of a sibling list, starting at `head`.
///
/// A chain that loops or leaves the container is reported as corruption
/// instead of being followed.
pub fn collect<R: Read + Seek>(reader: &mut R, head: Option<u32>, end: u64) -> Result<Vec<u32>> {
    let mut offsets = Vec::new();
    let mut seen = HashSet::new();
    let mut current = head;

    while let Some(offset) = current {
        check_node_offset(offset, end)?;
        if !seen.insert(offset) {
            return Err(OxiFsError::corrupted(offset as u64, "sibling chain loops"));
        }
        offsets.push(offset);
        current = layout::read_link_at(reader, offset as u64 + field::NEXT)?;
    }

    Ok(offsets)
}

/// Last node of one of `parent`'s child lists.
pub fn tail<R: Read + Seek>(
    reader: &mut R,
    parent: u32,
    kind: SiblingKind,
    end: u64,
) -> Result<Option<u32>> {
    let first = head(reader, parent, kind)?;
    Ok(collect(reader, first, end)?.last().copied())
}

/// Hook a freshly written node onto the end of a list.
///
/// `tail` must be the list's last node before the append; the new node's own
/// `prev` field is expected to already point at it.
pub fn link_tail<W: Write + Seek>(
    writer: &mut W,
    parent: u32,
    kind: SiblingKind,
    tail: Option<u32>,
    node: u32,
) -> Result<()> {
    match tail {
        Some(last) => layout::write_link_at(writer, last as u64 + field::NEXT, Some(node)),
        None => layout::write_link_at(writer, parent as u64 + kind.head_field(), Some(node)),
    }
}

/// Splice a node out of its list given its `prev` and `next` links.
///
/// The node's own record is left untouched and becomes unreachable.
pub fn unlink<W: Write + Seek>(
    writer: &mut W,
    parent: u32,
    kind: SiblingKind,
    prev: Option<u32>,
    next: Option<u32>,
) -> Result<()> {
    match prev {
        Some(prev) => layout::write_link_at(writer, prev as u64 + field::NEXT, next)?,
        None => layout::write_link_at(writer, parent as u64 + kind.head_field(), next)?,
    }
    if let Some(next) = next {
        layout::write_link_at(writer, next as u64 + field::PREV, prev)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DirectoryNode;
    use std::io::{Cursor, Seek, SeekFrom};

    /// Root at 4 with three child directories appended in order.
    fn image_with_children() -> (Cursor<Vec<u8>>, Vec<u32>) {
        let mut image = Cursor::new(vec![0u8; 4]);
        let root = DirectoryNode::new(ROOT_OFFSET, None, None, "/");
        image.seek(SeekFrom::End(0)).unwrap();
        image.write_all(&root.to_bytes().unwrap()).unwrap();

        let mut children = Vec::new();
        for name in ["a", "b", "c"] {
            let end = image.get_ref().len() as u64;
            let prev = tail(&mut image, ROOT_OFFSET, SiblingKind::Directory, end).unwrap();
            let dir = DirectoryNode::new(end as u32, Some(ROOT_OFFSET), prev, name);
            image.seek(SeekFrom::End(0)).unwrap();
            image.write_all(&dir.to_bytes().unwrap()).unwrap();
            link_tail(&mut image, ROOT_OFFSET, SiblingKind::Directory, prev, dir.offset).unwrap();
            children.push(dir.offset);
        }
        (image, children)
    }

    fn names(image: &mut Cursor<Vec<u8>>) -> Vec<String> {
        let end = image.get_ref().len() as u64;
        let first = head(image, ROOT_OFFSET, SiblingKind::Directory).unwrap();
        collect(image, first, end)
            .unwrap()
            .into_iter()
            .map(|offset| DirectoryNode::read(image, offset).unwrap().name)
            .collect()
    }

    #[test]
    fn test_append_keeps_order() {
        let (mut image, children) = image_with_children();
        assert_eq!(names(&mut image), ["a", "b", "c"]);

        let b = DirectoryNode::read(&mut image, children[1]).unwrap();
        assert_eq!(b.prev, Some(children[0]));
        assert_eq!(b.next, Some(children[2]));
    }

    #[test]
    fn test_unlink_middle_head_and_tail() {
        let (mut image, children) = image_with_children();

        let b = DirectoryNode::read(&mut image, children[1]).unwrap();
        unlink(&mut image, ROOT_OFFSET, SiblingKind::Directory, b.prev, b.next).unwrap();
        assert_eq!(names(&mut image), ["a", "c"]);
        let c = DirectoryNode::read(&mut image, children[2]).unwrap();
        assert_eq!(c.prev, Some(children[0]));

        let a = DirectoryNode::read(&mut image, children[0]).unwrap();
        unlink(&mut image, ROOT_OFFSET, SiblingKind::Directory, a.prev, a.next).unwrap();
        assert_eq!(names(&mut image), ["c"]);
        let c = DirectoryNode::read(&mut image, children[2]).unwrap();
        assert_eq!(c.prev, None);

        unlink(&mut image, ROOT_OFFSET, SiblingKind::Directory, c.prev, c.next).unwrap();
        assert!(names(&mut image).is_empty());
    }

    #[test]
    fn test_loop_is_corruption() {
        let (mut image, children) = image_with_children();
        layout::write_link_at(&mut image, children[2] as u64 + field::NEXT, Some(children[0]))
            .unwrap();

        let end = image.get_ref().len() as u64;
        let first = head(&mut image, ROOT_OFFSET, SiblingKind::Directory).unwrap();
        let err = collect(&mut image, first, end).unwrap_err();
        assert!(matches!(err, OxiFsError::CorruptedStructure { .. }));
    }

    #[test]
    fn test_out_of_range_link_is_corruption() {
        let (mut image, _) = image_with_children();
        let end = image.get_ref().len() as u64;
        assert!(collect(&mut image, Some(end as u32 + 100), end).is_err());
    }
}
