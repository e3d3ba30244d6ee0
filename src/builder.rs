use std::path::PathBuf;
use std::sync::Arc;

use crate::entry::Entry;
use crate::error::{ErrorAction, WalkError};
use crate::matcher::Name;
use crate::options::{Roots, WalkOptions};
use crate::results::{Item, Results};
use crate::traits::{FileSystem, Matcher};

// ---------------------------------------------------------------------------
// WalkBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a walk.
///
/// Created via [`readwalk::readdir()`](crate::readdir). Configure with chained
/// builder methods, then call [`run()`](WalkBuilder::run) or
/// [`run_async()`](WalkBuilder::run_async).
///
/// # Example
///
/// ```rust,ignore
/// let results = readwalk::readdir("src")
///     .recursive(true)
///     .nodir(true)
///     .on_file(|file| {
///         file.keep = Some(file.extname() == ".rs");
///         Ok(())
///     })
///     .run()?;
/// ```
pub struct WalkBuilder {
    roots:   Roots,
    options: WalkOptions,
}

impl WalkBuilder {
    pub fn new(roots: impl Into<Roots>) -> Self {
        Self {
            roots:   roots.into(),
            options: WalkOptions::default(),
        }
    }

    /// Start from an existing options value.
    pub fn with_options(mut self, options: WalkOptions) -> Self {
        self.options = options;
        self
    }

    // ── Recursion ─────────────────────────────────────────────────────────

    /// Descend into every subdirectory. Off by default: only the root's
    /// children are listed.
    pub fn recursive(mut self, yes: bool) -> Self {
        self.options.recursive = yes;
        self
    }

    /// Include `n` directory levels below the root. `1` means the root's
    /// children only.
    pub fn depth(mut self, n: usize) -> Self {
        self.options.depth = Some(n);
        self
    }

    // ── Filtering ─────────────────────────────────────────────────────────

    /// Include dotfiles. On by default.
    pub fn dot(mut self, yes: bool) -> Self {
        self.options.dot = yes;
        self
    }

    /// Leave directories out of the results. They are still descended.
    pub fn nodir(mut self, yes: bool) -> Self {
        self.options.nodir = yes;
        self
    }

    /// Keep only entries the matcher accepts.
    pub fn with_matcher(mut self, m: impl Matcher + 'static) -> Self {
        self.options.filter = Some(Arc::new(m));
        self
    }

    /// Shorthand for keeping entries with this exact base name.
    pub fn matching(self, name: impl Into<String>) -> Self {
        self.with_matcher(Name::new(name))
    }

    /// Drop entries the matcher accepts.
    pub fn ignoring(mut self, m: impl Matcher + 'static) -> Self {
        self.options.ignore = Some(Arc::new(m));
        self
    }

    /// Prune directories the matcher accepts: no `on_directory`, no output,
    /// no descent.
    pub fn skip_dir(mut self, m: impl Matcher + 'static) -> Self {
        self.options.skip_dir = Some(Arc::new(m));
        self
    }

    /// Pass over files the matcher accepts: no `on_file`, no output.
    pub fn skip_file(mut self, m: impl Matcher + 'static) -> Self {
        self.options.skip_file = Some(Arc::new(m));
        self
    }

    /// Emit each shaped value once, across all roots.
    pub fn unique(mut self, yes: bool) -> Self {
        self.options.unique = yes;
        self
    }

    // ── Symlinks ──────────────────────────────────────────────────────────

    /// `false` leaves symlinks out of the results; `true` also follows them.
    pub fn symlinks(mut self, yes: bool) -> Self {
        self.options.symlinks = Some(yes);
        self
    }

    /// Descend into symlinked directories. `false` also leaves symlinks out.
    pub fn follow(mut self, yes: bool) -> Self {
        self.options.follow = Some(yes);
        self
    }

    /// Report symlinks by their canonical target path.
    pub fn realpath(mut self, yes: bool) -> Self {
        self.options.realpath = yes;
        self
    }

    // ── Output ────────────────────────────────────────────────────────────

    /// Emit [`Entry`] values instead of paths.
    pub fn objects(mut self, yes: bool) -> Self {
        self.options.objects = yes;
        self
    }

    /// Emit absolute paths.
    pub fn absolute(mut self, yes: bool) -> Self {
        self.options.absolute = yes;
        self
    }

    /// Emit base names only.
    pub fn basename(mut self, yes: bool) -> Self {
        self.options.basename = yes;
        self
    }

    /// Compute relative output against `base` instead of the root.
    pub fn base(mut self, base: impl Into<PathBuf>) -> Self {
        self.options.base = Some(base.into());
        self
    }

    // ── Hooks ─────────────────────────────────────────────────────────────

    pub fn on_each<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Entry) -> Result<(), WalkError> + Send + Sync + 'static,
    {
        self.options.hooks.on_each = Some(Arc::new(f));
        self
    }

    pub fn on_file<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Entry) -> Result<(), WalkError> + Send + Sync + 'static,
    {
        self.options.hooks.on_file = Some(Arc::new(f));
        self
    }

    /// Runs before the directory is emitted and before the descent decision,
    /// so setting `recurse` here prunes or forces the subtree.
    pub fn on_directory<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Entry) -> Result<(), WalkError> + Send + Sync + 'static,
    {
        self.options.hooks.on_directory = Some(Arc::new(f));
        self
    }

    pub fn on_symbolic_link<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Entry) -> Result<(), WalkError> + Send + Sync + 'static,
    {
        self.options.hooks.on_symbolic_link = Some(Arc::new(f));
        self
    }

    /// Runs right before a value is appended. Setting `ignore` or
    /// `keep = Some(false)` here still suppresses it.
    pub fn on_push<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Entry) -> Result<(), WalkError> + Send + Sync + 'static,
    {
        self.options.hooks.on_push = Some(Arc::new(f));
        self
    }

    pub fn format<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Entry) -> Option<Item> + Send + Sync + 'static,
    {
        self.options.hooks.format = Some(Arc::new(f));
        self
    }

    /// Decide per failure whether the walk aborts. Without this hook every
    /// failure is fatal.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&WalkError) -> ErrorAction + Send + Sync + 'static,
    {
        self.options.hooks.on_error = Some(Arc::new(f));
        self
    }

    // ── Filesystem ────────────────────────────────────────────────────────

    /// Read from a custom [`FileSystem`] instead of `std::fs`.
    pub fn filesystem(mut self, fs: impl FileSystem + 'static) -> Self {
        self.options.fs = Arc::new(fs);
        self
    }

    /// The options built so far.
    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Walk on the calling thread and return the results.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error. Results gathered before it are
    /// discarded.
    pub fn run(self) -> Result<Results, WalkError> {
        crate::walk_sync(self.roots, &self.options)
    }

    /// Walk on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Same as [`run()`](WalkBuilder::run).
    pub async fn run_async(self) -> Result<Results, WalkError> {
        crate::walk(self.roots, &self.options).await
    }
}
