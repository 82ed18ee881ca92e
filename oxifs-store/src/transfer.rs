//! Moving files between the host file system and a container.

use crate::container::Container;
use crate::layout::FileNode;
use oxifs_core::error::{OxiFsError, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

impl Container {
    /// Import the host file at `source` as `name` in the current directory.
    pub fn import_file(&mut self, source: impl AsRef<Path>, name: &str) -> Result<FileNode> {
        let source = source.as_ref();
        if !source.is_file() {
            return Err(OxiFsError::source_missing(source));
        }
        let data = fs::read(source)?;
        debug!(source = %source.display(), name, bytes = data.len(), "importing file");
        self.add_file(name, &data)
    }

    /// Export the file `name` from the current directory to `dest`.
    ///
    /// Blocks are written to a staging file next to `dest` and renamed into
    /// place once every block has passed its checksum. On any failure no file
    /// is left at `dest`. Returns the number of bytes written.
    pub fn export_file_to(&mut self, name: &str, dest: impl AsRef<Path>) -> Result<u64> {
        self.export_file_with_progress(name, dest, |_, _| {})
    }

    /// Like [`Container::export_file_to`], calling `progress(done, total)` after each block.
    pub fn export_file_with_progress<F>(
        &mut self,
        name: &str,
        dest: impl AsRef<Path>,
        mut progress: F,
    ) -> Result<u64>
    where
        F: FnMut(u32, u32),
    {
        let dest = dest.as_ref();
        let file = self.find_file(name)?;
        let staging = staging_path(dest);

        let result = self
            .write_staged(&file, &staging, &mut progress)
            .and_then(|written| {
                fs::rename(&staging, dest)?;
                Ok(written)
            });

        match result {
            Ok(written) => {
                debug!(name, dest = %dest.display(), bytes = written, "exported file");
                Ok(written)
            }
            Err(err) => {
                let _ = fs::remove_file(&staging);
                if err.is_corruption() {
                    warn!(name, error = %err, "export aborted, file is corrupted");
                }
                Err(err)
            }
        }
    }

    fn write_staged<F>(&mut self, file: &FileNode, staging: &Path, progress: &mut F) -> Result<u64>
    where
        F: FnMut(u32, u32),
    {
        let mut out = BufWriter::new(File::create(staging)?);
        let mut written = 0u64;
        let mut done = 0u32;
        self.read_blocks_with(file, |chunk| {
            out.write_all(chunk)?;
            written += chunk.len() as u64;
            done += 1;
            progress(done, file.blocks_count);
            Ok(())
        })?;
        out.flush()?;
        Ok(written)
    }
}

/// Hidden sibling of `dest` used while an export is in flight.
fn staging_path(dest: &Path) -> PathBuf {
    let file_name = dest
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".to_string());
    dest.with_file_name(format!(".{file_name}.oxifs-part"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_import_missing_source() {
        let tmp = TempDir::new().unwrap();
        let mut store = Container::open(tmp.path().join("fs.bin")).unwrap();
        let err = store.import_file(tmp.path().join("nope.txt"), "nope.txt").unwrap_err();
        assert!(matches!(err, OxiFsError::SourceMissing { .. }));
        assert!(store.list().unwrap().files.is_empty());
    }

    #[test]
    fn test_import_then_export() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("in.txt");
        let content: Vec<u8> = (0..3000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&source, &content).unwrap();

        let mut store = Container::open(tmp.path().join("fs.bin")).unwrap();
        store.import_file(&source, "in.txt").unwrap();

        let dest = tmp.path().join("out.txt");
        let mut calls = Vec::new();
        let written = store
            .export_file_with_progress("in.txt", &dest, |done, total| calls.push((done, total)))
            .unwrap();
        assert_eq!(written, 3000);
        assert_eq!(fs::read(&dest).unwrap(), content);
        assert_eq!(calls, vec![(1, 3), (2, 3), (3, 3)]);
        assert!(!staging_path(&dest).exists());
    }

    #[test]
    fn test_export_unknown_name_creates_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut store = Container::open(tmp.path().join("fs.bin")).unwrap();
        let dest = tmp.path().join("out.txt");
        assert!(store.export_file_to("missing", &dest).unwrap_err().is_not_found());
        assert!(!dest.exists());
    }

    #[test]
    fn test_failed_rename_removes_staging_file() {
        let tmp = TempDir::new().unwrap();
        let mut store = Container::open(tmp.path().join("fs.bin")).unwrap();
        store.add_file("a.txt", b"some content").unwrap();

        let dest = tmp.path().join("taken");
        fs::create_dir(&dest).unwrap();
        fs::write(dest.join("keep"), b"x").unwrap();

        assert!(store.export_file_to("a.txt", &dest).is_err());
        assert!(!staging_path(&dest).exists());
        assert!(dest.join("keep").is_file());
    }

    #[test]
    fn test_staging_path_is_hidden_sibling() {
        assert_eq!(
            staging_path(Path::new("/tmp/out.txt")),
            PathBuf::from("/tmp/.out.txt.oxifs-part")
        );
    }
}
