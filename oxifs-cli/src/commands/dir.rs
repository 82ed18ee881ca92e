//! Mkdir and rmdir command implementations.

use super::CmdResult;
use crate::utils::format_size;
use dialoguer::Confirm;
use oxifs_store::Container;

pub fn cmd_mkdir(container: &mut Container, name: &str) -> CmdResult {
    container.make_directory(name)?;
    let parent = container.current_path()?;
    println!("Created directory {name} in {parent}");
    Ok(())
}

/// Remove a directory, asking first when it still has content.
pub fn cmd_rmdir(container: &mut Container, name: &str, yes: bool) -> CmdResult {
    let dir = container.find_directory(name)?;

    if !dir.is_empty() && !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Directory '{}' is not empty ({}). Remove it with everything inside?",
                name,
                format_size(dir.size as u64)
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Aborted");
            return Ok(());
        }
    }

    container.remove_directory_node(&dir)?;
    println!("Removed directory {name}");
    Ok(())
}
