//! OxiFS CLI - a whole file system in one file
//!
//! Stores directories and Huffman-compressed files inside a single container file.

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{
    CmdResult, ListOptions, cmd_add, cmd_compact, cmd_get, cmd_list, cmd_mkdir, cmd_rm, cmd_rmdir,
    cmd_shell, cmd_verify, enter_dir,
};
use oxifs_core::{ContainerConfig, DELETES_COUNT_FOR_DEFRAGMENTATION};
use oxifs_store::Container;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oxifs")]
#[command(author, version, about = "OxiFS - a whole file system in one file")]
#[command(long_about = "
OxiFS keeps a directory tree inside a single container file. File content is
split into 1 KiB blocks, each compressed with its own Huffman tree and guarded
by a checksum.

Examples:
  oxifs -f disk.bin mkdir docs
  oxifs -f disk.bin add report.txt --dir docs
  oxifs -f disk.bin list --dir docs
  oxifs -f disk.bin get report.txt ./report-copy.txt --dir docs
  oxifs -f disk.bin verify
  oxifs -f disk.bin shell
")]
struct Cli {
    /// Container file (created when missing)
    #[arg(short = 'f', long, global = true, default_value = "files.bin")]
    container: PathBuf,

    /// Compact the container after this many removals
    #[arg(long, global = true, default_value_t = DELETES_COUNT_FOR_DEFRAGMENTATION)]
    compact_after: u32,

    /// Sync the container to disk after every change
    #[arg(long, global = true)]
    sync: bool,

    /// Show debug logging and per-block details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy a host file into the container
    #[command(alias = "cpin")]
    Add {
        /// Host file to import
        source: PathBuf,

        /// Name inside the container (defaults to the source file name)
        name: Option<String>,

        /// Target directory, resolved from the root (e.g. docs/2024)
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// List a directory
    #[command(alias = "ls")]
    List {
        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Include only names matching pattern (glob syntax: *.txt)
        #[arg(short = 'I', long)]
        include: Vec<String>,

        /// Exclude names matching pattern (glob syntax)
        #[arg(short = 'X', long)]
        exclude: Vec<String>,

        /// Directory to list, resolved from the root
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// Copy a file out of the container
    #[command(alias = "cpout")]
    Get {
        /// Name inside the container
        name: String,

        /// Host destination path
        dest: PathBuf,

        /// Directory holding the file, resolved from the root
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// Remove files
    Rm {
        /// Names of the files to remove
        #[arg(required = true)]
        names: Vec<String>,

        /// Directory holding the files, resolved from the root
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// Create a directory
    #[command(alias = "md")]
    Mkdir {
        /// Name of the new directory
        name: String,

        /// Parent directory, resolved from the root
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// Remove a directory and everything inside it
    #[command(alias = "rd")]
    Rmdir {
        /// Name of the directory
        name: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Parent directory, resolved from the root
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// Check every block checksum
    Verify {
        /// Directory to start from, resolved from the root
        #[arg(short, long)]
        dir: Option<String>,
    },

    /// Rewrite the container without removed records
    Compact,

    /// Interactive shell (cpin, ls, rm, cpout, md, cd, rd, h, q)
    Shell,
}

fn main() {
    let cli = Cli::parse();
    utils::init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CmdResult {
    let config = ContainerConfig::new()
        .with_compaction_threshold(cli.compact_after)
        .with_sync_writes(cli.sync);
    let mut container = Container::open_with_config(&cli.container, config)?;

    match cli.command {
        Commands::Add { source, name, dir } => {
            enter_dir(&mut container, dir.as_deref())?;
            cmd_add(&mut container, &source, name.as_deref())
        }
        Commands::List {
            json,
            include,
            exclude,
            dir,
        } => {
            enter_dir(&mut container, dir.as_deref())?;
            let options = ListOptions {
                json,
                include: &include,
                exclude: &exclude,
            };
            cmd_list(&mut container, &options)
        }
        Commands::Get { name, dest, dir } => {
            enter_dir(&mut container, dir.as_deref())?;
            cmd_get(&mut container, &name, &dest)
        }
        Commands::Rm { names, dir } => {
            enter_dir(&mut container, dir.as_deref())?;
            cmd_rm(&mut container, &names)
        }
        Commands::Mkdir { name, dir } => {
            enter_dir(&mut container, dir.as_deref())?;
            cmd_mkdir(&mut container, &name)
        }
        Commands::Rmdir { name, yes, dir } => {
            enter_dir(&mut container, dir.as_deref())?;
            cmd_rmdir(&mut container, &name, yes)
        }
        Commands::Verify { dir } => {
            enter_dir(&mut container, dir.as_deref())?;
            cmd_verify(&mut container, cli.verbose)
        }
        Commands::Compact => cmd_compact(&mut container),
        Commands::Shell => cmd_shell(&mut container),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_aliases_parse() {
        let cli = Cli::try_parse_from(["oxifs", "-f", "x.bin", "cpin", "a.txt", "b.txt"]).unwrap();
        assert!(matches!(cli.command, Commands::Add { name: Some(ref n), .. } if n == "b.txt"));

        let cli = Cli::try_parse_from(["oxifs", "ls", "--json", "--dir", "docs/sub"]).unwrap();
        assert!(matches!(cli.command, Commands::List { json: true, dir: Some(_), .. }));

        let cli = Cli::try_parse_from(["oxifs", "rd", "old", "--yes"]).unwrap();
        assert!(matches!(cli.command, Commands::Rmdir { yes: true, .. }));

        assert!(Cli::try_parse_from(["oxifs", "rm"]).is_err());
    }
}
