use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::entry::Entry;

/// One emitted value: a path (relative, absolute or base name, depending on
/// the output mode) or the full [`Entry`] when `objects` is set.
#[derive(Debug, Clone)]
pub enum Item {
    Path(PathBuf),
    Entry(Entry),
}

impl Item {
    /// The path this item carries. For entries, the path relative to base.
    pub fn path(&self) -> &Path {
        match self {
            Item::Path(p) => p,
            Item::Entry(e) => e.relative(),
        }
    }

    /// The entry, when emitted in `objects` mode.
    pub fn as_entry(&self) -> Option<&Entry> {
        match self {
            Item::Entry(e) => Some(e),
            Item::Path(_) => None,
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            Item::Path(p) => p,
            Item::Entry(e) => e.relative().to_path_buf(),
        }
    }
}

/// The output of a completed walk.
#[derive(Debug)]
pub struct Results {
    /// Emitted values. Parents precede their descendants; unrelated branches
    /// may interleave when produced by the async walker.
    pub items: Vec<Item>,

    /// Walk statistics.
    pub stats: ScanStats,
}

impl Results {
    /// Paths of every item, in emission order.
    pub fn paths(&self) -> Vec<&Path> {
        self.items.iter().map(Item::path).collect()
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.items.into_iter().map(Item::into_path).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Statistics for a completed walk.
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    /// Non-directory entries visited (kept or not).
    pub files: usize,

    /// Directories visited, excluding roots.
    pub dirs: usize,

    /// Symlinks encountered, followed or not.
    pub symlinks: usize,

    /// Wall-clock time from walk start to completion.
    pub duration: Duration,

    /// Total entries visited per second. Equals
    /// `(files + dirs) / duration.as_secs_f64()`, clamped to 0 on
    /// zero-duration runs.
    pub entries_per_sec: usize,
}

impl ScanStats {
    pub(crate) fn compute(files: usize, dirs: usize, symlinks: usize, duration: Duration) -> Self {
        let total = files + dirs;
        let eps = if duration.as_secs_f64() > 0.0 {
            (total as f64 / duration.as_secs_f64()) as usize
        } else {
            0
        };
        Self {
            files,
            dirs,
            symlinks,
            duration,
            entries_per_sec: eps,
        }
    }
}
