//! Rm command implementation.

use super::CmdResult;
use oxifs_store::Container;

pub fn cmd_rm(container: &mut Container, names: &[String]) -> CmdResult {
    for name in names {
        let before = container.len()?;
        let pending = container.deletes_count();
        container.remove_file(name)?;
        println!("Removed {name}");

        if container.deletes_count() <= pending {
            println!(
                "Container compacted: {} -> {} bytes",
                before,
                container.len()?
            );
        }
    }
    Ok(())
}
