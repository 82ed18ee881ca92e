//! Add command implementation.

use super::CmdResult;
use crate::utils::{create_spinner, format_size};
use oxifs_store::Container;
use std::path::Path;

pub fn cmd_add(container: &mut Container, source: &Path, name: Option<&str>) -> CmdResult {
    let name = match name {
        Some(name) => name.to_string(),
        None => source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or("source path has no file name; pass a name explicitly")?,
    };

    let spinner = create_spinner(format!("Compressing {}", source.display()));
    let result = container.import_file(source, &name);
    spinner.finish_and_clear();
    let file = result?;

    let original = std::fs::metadata(source).map(|m| m.len()).unwrap_or(0);
    println!(
        "Added {} to {}: {} blocks, {} stored, {} charged",
        name,
        container.current_path()?,
        file.blocks_count,
        format_size(file.content_len as u64),
        format_size(container.config().charged_size(file.blocks_count)),
    );
    if original > 0 {
        let ratio = file.content_len as f64 / original as f64 * 100.0;
        println!("  Ratio: {ratio:.1}% of {}", format_size(original));
    }
    Ok(())
}
