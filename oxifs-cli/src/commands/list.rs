//! List command implementation.

use super::CmdResult;
use crate::utils::{format_size, matches_filters};
use oxifs_core::EntryKind;
use oxifs_store::{Container, Entry};
use serde::{Deserialize, Serialize};

/// JSON serializable entry data for directory listings.
#[derive(Debug, Serialize, Deserialize)]
struct EntryJson {
    name: String,
    kind: String,
    size: u64,
    offset: u32,
}

impl EntryJson {
    fn from_entry(entry: &Entry) -> Self {
        Self {
            name: entry.name.clone(),
            kind: entry.kind.to_string(),
            size: entry.size,
            offset: entry.offset,
        }
    }
}

/// JSON output for a directory listing.
#[derive(Debug, Serialize, Deserialize)]
struct ListingJson {
    container: String,
    path: String,
    directories: Vec<EntryJson>,
    files: Vec<EntryJson>,
}

/// Options for listing a directory.
pub struct ListOptions<'a> {
    pub json: bool,
    pub include: &'a [String],
    pub exclude: &'a [String],
}

pub fn cmd_list(container: &mut Container, options: &ListOptions) -> CmdResult {
    let listing = container.list()?;
    let path = container.current_path()?;

    let keep = |entries: Vec<Entry>| -> Vec<Entry> {
        entries
            .into_iter()
            .filter(|e| matches_filters(&e.name, options.include, options.exclude))
            .collect()
    };
    let directories = keep(listing.directories);
    let files = keep(listing.files);

    if options.json {
        let output = ListingJson {
            container: container.path().display().to_string(),
            path,
            directories: directories.iter().map(EntryJson::from_entry).collect(),
            files: files.iter().map(EntryJson::from_entry).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Container: {}", container.path().display());
    println!("Directory: {path}");
    println!();
    println!("{:>12}  Name", "Size");
    println!("{}", "-".repeat(40));

    let mut total = 0u64;
    for entry in directories.iter().chain(files.iter()) {
        let prefix = match entry.kind {
            EntryKind::Directory => "d ",
            EntryKind::File => "  ",
        };
        println!("{:>12}  {}{}", format_size(entry.size), prefix, entry.name);
        total += entry.size;
    }

    println!("{}", "-".repeat(40));
    println!(
        "{:>12}  {} directories, {} files",
        format_size(total),
        directories.len(),
        files.len()
    );
    Ok(())
}
