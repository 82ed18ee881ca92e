//! Verify command implementation.

use super::CmdResult;
use oxifs_store::Container;

pub fn cmd_verify(container: &mut Container, verbose: bool) -> CmdResult {
    let from = container.current_path()?;
    println!("Verifying {} from {}", container.path().display(), from);

    let checks = container.verify_tree()?;
    let mut failed = 0usize;

    for check in &checks {
        match &check.error {
            None => {
                if verbose {
                    println!("  OK: {} ({} blocks)", check.path, check.blocks);
                    let file = container.get_file_node(check.offset)?;
                    for (i, block) in container.block_locations(&file)?.iter().enumerate() {
                        println!(
                            "      block {i}: @{} len {} tree {}B encoded {}B crc {:#010x}",
                            block.offset,
                            block.uncompressed_len,
                            block.tree_len,
                            block.encoded_len,
                            block.checksum
                        );
                    }
                }
            }
            Some(e) => {
                failed += 1;
                println!("  FAILED: {} - {}", check.path, e);
            }
        }
    }

    println!();
    println!("Files: {}, OK: {}, Failed: {}", checks.len(), checks.len() - failed, failed);

    if failed > 0 {
        return Err(format!("{failed} corrupted file(s); remove them with `oxifs rm`").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_verify_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        let mut container = Container::open(tmp.path().join("fs.bin")).unwrap();
        container.make_directory("docs").unwrap();
        container.change_directory("docs").unwrap();
        container.add_file("a.txt", &b"abc".repeat(700)).unwrap();

        assert!(cmd_verify(&mut container, true).is_ok());
        assert_eq!(container.current_path().unwrap(), "/docs");
    }
}
