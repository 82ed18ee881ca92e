//! Compact command implementation.

use super::CmdResult;
use crate::utils::format_size;
use oxifs_store::Container;

pub fn cmd_compact(container: &mut Container) -> CmdResult {
    let stats = container.compact()?;
    println!("Compacted {}", container.path().display());
    println!("  Before:      {}", format_size(stats.bytes_before));
    println!("  After:       {}", format_size(stats.bytes_after));
    println!("  Reclaimed:   {}", format_size(stats.reclaimed()));
    println!("  Directories: {}", stats.directories);
    println!("  Files:       {}", stats.files);
    Ok(())
}
