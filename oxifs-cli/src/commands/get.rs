//! Get command implementation.

use super::CmdResult;
use crate::utils::create_progress_bar;
use oxifs_store::Container;
use std::path::Path;

pub fn cmd_get(container: &mut Container, name: &str, dest: &Path) -> CmdResult {
    let file = container.find_file(name)?;
    let pb = create_progress_bar(file.blocks_count as u64, file.blocks_count > 1);

    let result =
        container.export_file_with_progress(name, dest, |done, _| pb.set_position(done as u64));
    match result {
        Ok(written) => {
            pb.finish_with_message("Done");
            println!("Copied {} to {} ({} bytes)", name, dest.display(), written);
            Ok(())
        }
        Err(e) => {
            pb.abandon();
            if e.is_corruption() {
                eprintln!("The file is corrupted and can't be used anymore. Remove it with `oxifs rm {name}`.");
            }
            Err(e.into())
        }
    }
}
