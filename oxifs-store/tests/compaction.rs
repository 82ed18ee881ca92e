//! Automatic and manual compaction.

use oxifs_core::config::ContainerConfig;
use oxifs_store::{Container, ROOT_OFFSET};
use tempfile::TempDir;

fn content(i: usize) -> Vec<u8> {
    format!("file number {i} ").repeat(40 + i * 13).into_bytes()
}

fn header(tmp: &TempDir) -> u32 {
    let bytes = std::fs::read(tmp.path().join("fs.bin")).unwrap();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[test]
fn test_fifth_removal_compacts() {
    let tmp = TempDir::new().unwrap();
    let mut fs = Container::open(tmp.path().join("fs.bin")).unwrap();

    fs.make_directory("work").unwrap();
    fs.change_directory("work").unwrap();
    fs.make_directory("nested").unwrap();
    for i in 0..8 {
        fs.add_file(&format!("f{i}"), &content(i)).unwrap();
    }

    for i in 0..4 {
        fs.remove_file(&format!("f{i}")).unwrap();
        assert_eq!(fs.deletes_count(), i as u32 + 1);
        assert_eq!(header(&tmp), i as u32 + 1);
    }
    let before = fs.len().unwrap();

    fs.remove_file("f4").unwrap();
    assert_eq!(fs.deletes_count(), 0);
    assert_eq!(header(&tmp), 0);
    assert!(fs.len().unwrap() < before);
    assert!(!tmp.path().join("fs.bin.tmp").exists());

    assert_eq!(fs.current_path().unwrap(), "/work");
    let names: Vec<_> = fs.list().unwrap().files.into_iter().map(|e| e.name).collect();
    assert_eq!(names, ["f5", "f6", "f7"]);
    for i in 5..8 {
        assert_eq!(fs.export_file(&format!("f{i}")).unwrap(), content(i));
    }
    assert_eq!(fs.list().unwrap().directories[0].name, "nested");

    let root_size = fs.get_directory_node(ROOT_OFFSET).unwrap().size;
    assert_eq!(root_size, fs.current_directory().unwrap().size);
    let charged: u64 = fs.list().unwrap().files.iter().map(|e| e.size).sum();
    assert_eq!(root_size as u64, charged);
}

#[test]
fn test_failed_compaction_keeps_removal_and_retries() {
    let tmp = TempDir::new().unwrap();
    let config = ContainerConfig::new().with_compaction_threshold(2);
    let mut fs = Container::open_with_config(tmp.path().join("fs.bin"), config).unwrap();
    for i in 0..4 {
        fs.add_file(&format!("f{i}"), &content(i)).unwrap();
    }

    // A directory in the staging spot makes compaction fail to start.
    let blocker = tmp.path().join("fs.bin.tmp");
    std::fs::create_dir(&blocker).unwrap();

    fs.remove_file("f0").unwrap();
    fs.remove_file("f1").unwrap();
    assert_eq!(fs.deletes_count(), 2);
    assert_eq!(header(&tmp), 2);
    let names: Vec<_> = fs.list().unwrap().files.into_iter().map(|e| e.name).collect();
    assert_eq!(names, ["f2", "f3"]);

    std::fs::remove_dir(&blocker).unwrap();
    let before = fs.len().unwrap();
    fs.remove_file("f2").unwrap();
    assert_eq!(fs.deletes_count(), 0);
    assert_eq!(header(&tmp), 0);
    assert!(fs.len().unwrap() < before);
    assert_eq!(fs.export_file("f3").unwrap(), content(3));
}

#[test]
fn test_compacted_container_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let config = ContainerConfig::new().with_compaction_threshold(2);
    {
        let mut fs = Container::open_with_config(tmp.path().join("fs.bin"), config).unwrap();
        fs.make_directory("a").unwrap();
        fs.make_directory("b").unwrap();
        fs.change_directory("b").unwrap();
        fs.add_file("keep", &content(3)).unwrap();
        fs.change_directory("..").unwrap();
        fs.remove_directory("a").unwrap();
        fs.add_file("tmp", b"tmp").unwrap();
        fs.remove_file("tmp").unwrap();
        assert_eq!(fs.deletes_count(), 0);
    }

    let mut fs = Container::open_with_config(tmp.path().join("fs.bin"), config).unwrap();
    let dirs: Vec<_> = fs.list().unwrap().directories.into_iter().map(|e| e.name).collect();
    assert_eq!(dirs, ["b"]);
    fs.change_directory("b").unwrap();
    assert_eq!(fs.export_file("keep").unwrap(), content(3));
}

#[test]
fn test_manual_compaction_reports_stats() {
    let tmp = TempDir::new().unwrap();
    let config = ContainerConfig::new().with_compaction_threshold(100);
    let mut fs = Container::open_with_config(tmp.path().join("fs.bin"), config).unwrap();

    fs.make_directory("d").unwrap();
    fs.add_file("gone", &content(10)).unwrap();
    fs.add_file("kept", &content(1)).unwrap();
    fs.remove_file("gone").unwrap();
    assert_eq!(fs.deletes_count(), 1);

    let stats = fs.compact().unwrap();
    assert_eq!(stats.directories, 2);
    assert_eq!(stats.files, 1);
    assert!(stats.reclaimed() > 0);
    assert_eq!(stats.bytes_after, fs.len().unwrap());
    assert_eq!(fs.deletes_count(), 0);
    assert_eq!(fs.export_file("kept").unwrap(), content(1));
}

#[test]
fn test_orphaned_subtree_is_dropped() {
    let tmp = TempDir::new().unwrap();
    let config = ContainerConfig::new().with_compaction_threshold(100);
    let mut fs = Container::open_with_config(tmp.path().join("fs.bin"), config).unwrap();

    fs.make_directory("top").unwrap();
    fs.change_directory("top").unwrap();
    fs.make_directory("deep").unwrap();
    fs.change_directory("deep").unwrap();
    fs.add_file("buried", &content(20)).unwrap();
    fs.change_directory("\\").unwrap();
    fs.remove_directory("top").unwrap();

    let stats = fs.compact().unwrap();
    assert_eq!(stats.directories, 1);
    assert_eq!(stats.files, 0);
    assert!(fs.get_directory_node(ROOT_OFFSET).unwrap().is_empty());
    assert_eq!(fs.get_directory_node(ROOT_OFFSET).unwrap().size, 0);
}
