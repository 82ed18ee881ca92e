//! Interactive shell.
//!
//! Every line is one command; arguments are separated by whitespace.
//! Failures are reported and the loop continues.

use super::CmdResult;
use oxifs_core::OxiFsError;
use oxifs_store::Container;
use std::io::{self, BufRead, Write};

const HELP: &str = "\
Commands:
  cpin <source> <name>   copy a host file into the current directory
  ls                     list the current directory
  rm <name>              remove a file
  cpout <name> <dest>    copy a file out to the host
  md <name>              create a directory
  cd <name|..|\\>         change directory (\\ is the root)
  rd <name>              remove a directory and everything inside
  h                      show this help
  q                      quit";

pub fn cmd_shell(container: &mut Container) -> CmdResult {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_shell(container, stdin.lock(), stdout.lock())?;
    Ok(())
}

/// Run the command loop until `q` or end of input.
pub fn run_shell<R: BufRead, W: Write>(
    container: &mut Container,
    mut input: R,
    mut out: W,
) -> io::Result<()> {
    writeln!(out, "Write h to see all commands.")?;
    let mut line = String::new();

    loop {
        let prompt = container
            .current_path()
            .unwrap_or_else(|_| "?".to_string());
        write!(out, "{prompt}> ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = args.split_first() else {
            writeln!(out, "Please enter a valid command.")?;
            continue;
        };

        match (command, rest) {
            ("q", []) => break,
            ("h", []) => writeln!(out, "{HELP}")?,
            ("ls", []) => list(container, &mut out)?,
            ("cpin", [source, name]) => {
                match container.import_file(source, name) {
                    Ok(file) => writeln!(out, "Added {name} ({} blocks).", file.blocks_count)?,
                    Err(OxiFsError::SourceMissing { .. }) => {
                        writeln!(out, "Please provide an existing file.")?
                    }
                    Err(e) => report(&mut out, &e)?,
                }
            }
            ("rm", [name]) => match container.remove_file(name) {
                Ok(()) => writeln!(out, "Successful removal.")?,
                Err(e) => report(&mut out, &e)?,
            },
            ("cpout", [name, dest]) => match container.export_file_to(name, dest) {
                Ok(_) => writeln!(out, "File copied successfully.")?,
                Err(e) if e.is_corruption() => writeln!(
                    out,
                    "The file is corrupted and can't be used anymore. Please remove it from the container."
                )?,
                Err(e) => report(&mut out, &e)?,
            },
            ("md", [name]) => {
                if let Err(e) = container.make_directory(name) {
                    report(&mut out, &e)?;
                }
            }
            ("cd", [target]) => {
                if let Err(e) = container.change_directory(target) {
                    report(&mut out, &e)?;
                }
            }
            ("rd", [name]) => match container.remove_directory(name) {
                Ok(()) => writeln!(out, "Successful removal.")?,
                Err(e) => report(&mut out, &e)?,
            },
            ("q" | "h" | "ls" | "cpin" | "rm" | "cpout" | "md" | "cd" | "rd", _) => {
                writeln!(out, "Please provide data in the correct format.")?
            }
            _ => writeln!(out, "Please enter a valid command.")?,
        }
    }
    Ok(())
}

fn list<W: Write>(container: &mut Container, out: &mut W) -> io::Result<()> {
    let listing = match container.list() {
        Ok(listing) => listing,
        Err(e) => return report(out, &e),
    };
    writeln!(out, "Files:")?;
    for file in &listing.files {
        writeln!(out, "{}    {}B", file.name, file.size)?;
    }
    writeln!(out, "Folders:")?;
    for dir in &listing.directories {
        writeln!(out, "{}    {}B", dir.name, dir.size)?;
    }
    Ok(())
}

fn report<W: Write>(out: &mut W, error: &OxiFsError) -> io::Result<()> {
    match error {
        OxiFsError::NotFound { kind, .. } => writeln!(out, "No such {kind} found."),
        e => writeln!(out, "Error: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn run(container: &mut Container, script: &str) -> String {
        let mut out = Vec::new();
        run_shell(container, Cursor::new(script.to_string()), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_session() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("notes.txt");
        let dest = tmp.path().join("copy.txt");
        fs::write(&source, "remember the milk\n".repeat(100)).unwrap();
        let mut container = Container::open(tmp.path().join("fs.bin")).unwrap();

        let script = format!(
            "md docs\ncd docs\ncpin {} notes.txt\nls\ncpout notes.txt {}\nrm notes.txt\nrm notes.txt\ncd ..\nls\nq\n",
            source.display(),
            dest.display()
        );
        let output = run(&mut container, &script);

        assert!(output.contains("/docs> "));
        assert!(output.contains("notes.txt    2048B"));
        assert!(output.contains("File copied successfully."));
        assert!(output.contains("Successful removal."));
        assert!(output.contains("No such file found."));
        assert!(output.contains("docs    0B"));
        assert_eq!(fs::read(&dest).unwrap(), fs::read(&source).unwrap());
    }

    #[test]
    fn test_bad_input_is_reported() {
        let tmp = TempDir::new().unwrap();
        let mut container = Container::open(tmp.path().join("fs.bin")).unwrap();

        let script = "\nfrobnicate\ncd\ncpin /definitely/not/here x\ncd nowhere\n";
        let output = run(&mut container, script);
        assert_eq!(output.matches("Please enter a valid command.").count(), 2);
        assert!(output.contains("Please provide data in the correct format."));
        assert!(output.contains("Please provide an existing file."));
        assert!(output.contains("No such directory found."));
        assert_eq!(container.current_path().unwrap(), "/");
    }
}
