//! Command implementations for OxiFS CLI.

pub mod add;
pub mod compact;
pub mod dir;
pub mod get;
pub mod list;
pub mod remove;
pub mod shell;
pub mod verify;

pub use add::cmd_add;
pub use compact::cmd_compact;
pub use dir::{cmd_mkdir, cmd_rmdir};
pub use get::cmd_get;
pub use list::{ListOptions, cmd_list};
pub use remove::cmd_rm;
pub use shell::cmd_shell;
pub use verify::cmd_verify;

use oxifs_store::Container;

/// Result type shared by all commands.
pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Move the cursor to `dir` (resolved from the root) when one is given.
pub fn enter_dir(container: &mut Container, dir: Option<&str>) -> CmdResult {
    if let Some(dir) = dir {
        container.change_directory("/")?;
        container.change_directory_path(dir)?;
    }
    Ok(())
}
