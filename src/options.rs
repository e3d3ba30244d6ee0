use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::entry::Entry;
use crate::error::{ErrorAction, WalkError};
use crate::fs::StdFileSystem;
use crate::results::Item;
use crate::traits::{FileSystem, Matcher};

/// Per-entry hook. Mutate the entry to steer the walk; return an error to
/// fail it (subject to `on_error`).
pub type Hook = Arc<dyn Fn(&mut Entry) -> Result<(), WalkError> + Send + Sync>;

/// Output override. `Some` replaces the shaped value; `None` shapes the
/// (possibly modified) entry as usual.
pub type FormatHook = Arc<dyn Fn(&mut Entry) -> Option<Item> + Send + Sync>;

/// Decides whether a failure is fatal.
pub type ErrorHook = Arc<dyn Fn(&WalkError) -> ErrorAction + Send + Sync>;

/// Callbacks invoked during a walk.
///
/// For each child the order is `on_each`, `on_symbolic_link` (symlinks only),
/// then `on_directory` or `on_file`. `on_push` runs right before a value is
/// appended to the results. None of them run for the root itself.
#[derive(Clone, Default)]
pub struct Hooks {
    pub on_each:          Option<Hook>,
    pub on_file:          Option<Hook>,
    pub on_directory:     Option<Hook>,
    pub on_symbolic_link: Option<Hook>,
    pub on_push:          Option<Hook>,
    pub format:           Option<FormatHook>,
    pub on_error:         Option<ErrorHook>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_each", &self.on_each.is_some())
            .field("on_file", &self.on_file.is_some())
            .field("on_directory", &self.on_directory.is_some())
            .field("on_symbolic_link", &self.on_symbolic_link.is_some())
            .field("on_push", &self.on_push.is_some())
            .field("format", &self.format.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// How kept entries are shaped into [`Item`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Path relative to base.
    Relative,
    /// Absolute path.
    Absolute,
    /// Base name only.
    Basename,
    /// The entry itself.
    Objects,
}

/// Configuration for one walk.
///
/// Built once per call and never mutated by the engine. `Default` gives a
/// single-level listing that includes dotfiles and first-level symlinks.
#[derive(Clone)]
pub struct WalkOptions {
    /// Descend into every subdirectory.
    pub recursive: bool,

    /// Number of directory levels to include. `Some(1)` lists the root's
    /// children only. Any depth turns recursion on.
    pub depth: Option<usize>,

    /// Include entries whose name starts with `.`.
    pub dot: bool,

    /// Leave directories out of the results (they are still descended).
    pub nodir: bool,

    /// `Some(false)` leaves symlinks out; `Some(true)` also follows them.
    pub symlinks: Option<bool>,

    /// `Some(true)` descends into symlinked directories; `Some(false)` also
    /// leaves symlinks out of the results.
    pub follow: Option<bool>,

    /// Replace symlink paths by their canonical target.
    pub realpath: bool,

    /// Suppress duplicate values, across roots too.
    pub unique: bool,

    /// Emit entries instead of paths.
    pub objects: bool,

    /// Emit absolute paths.
    pub absolute: bool,

    /// Emit base names.
    pub basename: bool,

    /// Path relative output is computed against. Defaults to each root.
    pub base: Option<PathBuf>,

    /// Keep only entries this matches.
    pub filter: Option<Arc<dyn Matcher>>,

    /// Drop entries this matches.
    pub ignore: Option<Arc<dyn Matcher>>,

    /// Directories matching this get no `on_directory`, and are neither
    /// emitted nor descended. Checked after `on_each`.
    pub skip_dir: Option<Arc<dyn Matcher>>,

    /// Files matching this get no `on_file` and are not emitted. Checked
    /// after `on_each`.
    pub skip_file: Option<Arc<dyn Matcher>>,

    pub hooks: Hooks,

    pub fs: Arc<dyn FileSystem>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            depth:     None,
            dot:       true,
            nodir:     false,
            symlinks:  None,
            follow:    None,
            realpath:  false,
            unique:    false,
            objects:   false,
            absolute:  false,
            basename:  false,
            base:      None,
            filter:    None,
            ignore:    None,
            skip_dir:  None,
            skip_file: None,
            hooks:     Hooks::default(),
            fs:        Arc::new(StdFileSystem),
        }
    }
}

impl fmt::Debug for WalkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkOptions")
            .field("recursive", &self.recursive)
            .field("depth", &self.depth)
            .field("dot", &self.dot)
            .field("nodir", &self.nodir)
            .field("symlinks", &self.symlinks)
            .field("follow", &self.follow)
            .field("realpath", &self.realpath)
            .field("unique", &self.unique)
            .field("output", &self.output_mode())
            .field("base", &self.base)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl WalkOptions {
    /// Output mode, by priority: objects, absolute, basename, relative.
    pub fn output_mode(&self) -> OutputMode {
        if self.objects {
            OutputMode::Objects
        } else if self.absolute {
            OutputMode::Absolute
        } else if self.basename {
            OutputMode::Basename
        } else {
            OutputMode::Relative
        }
    }

    /// Whether symlinks appear in the results.
    pub fn include_symlinks(&self) -> bool {
        (self.symlinks != Some(false) && self.follow != Some(false)) || self.realpath
    }

    /// Whether symlinked directories are descended into.
    pub fn follow_symlinks(&self) -> bool {
        self.follow == Some(true) || self.symlinks == Some(true) || self.realpath
    }

    /// Default descent decision for directories without a `recurse` override.
    pub fn recurse_default(&self) -> bool {
        self.recursive || self.depth.is_some_and(|d| d > 0)
    }
}

// ---------------------------------------------------------------------------
// Roots
// ---------------------------------------------------------------------------

/// One or more starting directories.
///
/// Converts from a single path-like value or a list of them. A list runs one
/// traversal per root into a shared result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    paths: Vec<PathBuf>,
    multi: bool,
}

impl Roots {
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self {
            paths: vec![path.into()],
            multi: false,
        }
    }

    pub fn many<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            multi: true,
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Whether this came from a list, even a one-element one.
    pub fn is_multi(&self) -> bool {
        self.multi
    }

    /// Reject lists that are empty or contain an empty path.
    pub(crate) fn validate(&self) -> Result<(), WalkError> {
        if self.paths.is_empty() {
            return Err(WalkError::InvalidArgument("no starting directory given".into()));
        }
        if self.paths.iter().any(|p| p.as_os_str().is_empty()) {
            return Err(WalkError::InvalidArgument("starting directory is an empty path".into()));
        }
        Ok(())
    }
}

impl From<&str> for Roots {
    fn from(p: &str) -> Self {
        Roots::single(p)
    }
}

impl From<String> for Roots {
    fn from(p: String) -> Self {
        Roots::single(p)
    }
}

impl From<&Path> for Roots {
    fn from(p: &Path) -> Self {
        Roots::single(p)
    }
}

impl From<PathBuf> for Roots {
    fn from(p: PathBuf) -> Self {
        Roots::single(p)
    }
}

impl From<&PathBuf> for Roots {
    fn from(p: &PathBuf) -> Self {
        Roots::single(p.clone())
    }
}

impl<P: Into<PathBuf>> From<Vec<P>> for Roots {
    fn from(paths: Vec<P>) -> Self {
        Roots::many(paths)
    }
}

impl<P: Into<PathBuf>, const N: usize> From<[P; N]> for Roots {
    fn from(paths: [P; N]) -> Self {
        Roots::many(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_list_one_level_with_dotfiles() {
        let opts = WalkOptions::default();
        assert!(opts.dot);
        assert!(!opts.recurse_default());
        assert!(opts.include_symlinks());
        assert!(!opts.follow_symlinks());
        assert_eq!(opts.output_mode(), OutputMode::Relative);
    }

    #[test]
    fn output_mode_priority() {
        let opts = WalkOptions {
            objects: true,
            absolute: true,
            ..Default::default()
        };
        assert_eq!(opts.output_mode(), OutputMode::Objects);

        let opts = WalkOptions {
            absolute: true,
            basename: true,
            ..Default::default()
        };
        assert_eq!(opts.output_mode(), OutputMode::Absolute);
    }

    #[test]
    fn symlink_policy() {
        let opts = WalkOptions {
            symlinks: Some(false),
            ..Default::default()
        };
        assert!(!opts.include_symlinks());

        let opts = WalkOptions {
            follow: Some(false),
            realpath: true,
            ..Default::default()
        };
        assert!(opts.include_symlinks());
        assert!(opts.follow_symlinks());
    }

    #[test]
    fn depth_turns_recursion_on() {
        let opts = WalkOptions {
            depth: Some(2),
            ..Default::default()
        };
        assert!(opts.recurse_default());
    }

    #[test]
    fn roots_validate() {
        assert!(Roots::from(Vec::<PathBuf>::new()).validate().is_err());
        assert!(Roots::from("").validate().is_err());
        assert!(Roots::from(["a", "b"]).is_multi());
        assert!(!Roots::from("a").is_multi());
    }
}
