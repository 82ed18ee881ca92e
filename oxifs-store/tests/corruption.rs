//! Damaged block payloads are detected, never silently exported.

use oxifs_store::Container;
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use tempfile::TempDir;

const TEXT: &[u8] = b"The quick brown fox jumps over the lazy dog. Pack my box with five dozen liquor jugs.";

/// Store `TEXT` twice over, then zero the encoded bytes of its second block.
fn damaged_container(tmp: &TempDir) -> Container {
    let path = tmp.path().join("fs.bin");
    let data: Vec<u8> = TEXT.iter().copied().cycle().take(2000).collect();

    let location = {
        let mut fs = Container::open(&path).unwrap();
        fs.add_file("clean.txt", TEXT).unwrap();
        let file = fs.add_file("story.txt", &data).unwrap();
        fs.block_locations(&file).unwrap()[1]
    };

    let mut raw = OpenOptions::new().write(true).open(&path).unwrap();
    raw.seek(SeekFrom::Start(location.encoded_offset)).unwrap();
    raw.write_all(&vec![0u8; location.encoded_len as usize]).unwrap();
    drop(raw);

    Container::open(&path).unwrap()
}

#[test]
fn test_export_of_damaged_file_fails_without_output() {
    let tmp = TempDir::new().unwrap();
    let mut fs = damaged_container(&tmp);
    let dest = tmp.path().join("story.out");

    let err = fs.export_file_to("story.txt", &dest).unwrap_err();
    assert!(err.is_corruption(), "unexpected error: {err}");
    assert!(!dest.exists());
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);

    assert!(fs.export_file("story.txt").unwrap_err().is_corruption());
}

#[test]
fn test_damage_is_local_to_one_file() {
    let tmp = TempDir::new().unwrap();
    let mut fs = damaged_container(&tmp);

    assert_eq!(fs.export_file("clean.txt").unwrap(), TEXT);

    let story = fs.find_file("story.txt").unwrap();
    let (first, _) = fs.read_validated_block(story.content_offset()).unwrap();
    assert_eq!(first.len(), 1024);
}

#[test]
fn test_verify_reports_damaged_file_and_removal_recovers() {
    let tmp = TempDir::new().unwrap();
    let mut fs = damaged_container(&tmp);

    let checks = fs.verify_tree().unwrap();
    assert_eq!(checks.len(), 2);
    let bad: Vec<_> = checks.iter().filter(|c| !c.is_ok()).collect();
    assert_eq!(bad.len(), 1);
    assert_eq!(bad[0].path, "/story.txt");
    assert_eq!(bad[0].blocks, 2);

    fs.remove_file("story.txt").unwrap();
    assert!(fs.verify_tree().unwrap().iter().all(|c| c.is_ok()));
}
