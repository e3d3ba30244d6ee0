use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::entry::{EntryKind, RawEntry};
use crate::traits::FileSystem;

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<RawEntry>> {
        let mut entries = Vec::new();
        for dent in fs::read_dir(path)? {
            let dent = dent?;
            // file_type() does not follow symlinks
            let kind = EntryKind::from_file_type(dent.file_type()?);
            entries.push(RawEntry::new(dent.file_name(), kind));
        }
        Ok(entries)
    }

    fn stat(&self, path: &Path) -> io::Result<EntryKind> {
        fs::metadata(path).map(|m| EntryKind::from_file_type(m.file_type()))
    }

    fn lstat(&self, path: &Path) -> io::Result<EntryKind> {
        fs::symlink_metadata(path).map(|m| EntryKind::from_file_type(m.file_type()))
    }

    fn realpath(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }
}
