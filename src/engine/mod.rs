//! The traversal engine.
//!
//! [`Walker`] holds every decision the walk makes: root resolution, per-child
//! hook order, symlink resolution, descent and the keep/drop/shape rules of
//! the collector. The two drivers only differ in how they wait:
//! [`blocking`] calls the filesystem inline and recurses on the stack,
//! [`concurrent`] runs filesystem calls on tokio's blocking pool and walks
//! sibling directories as separate tasks.

pub(crate) mod blocking;
pub(crate) mod concurrent;

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, trace};

use crate::entry::{Entry, EntryKind, RawEntry};
use crate::error::{ErrorAction, WalkError};
use crate::options::{Hook, OutputMode, WalkOptions};
use crate::results::{Item, Results, ScanStats};

/// Marker returned once a fatal error has been latched in the
/// [`TraversalState`]. The error itself is retrieved when the walk finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Halt;

pub(crate) type Step<T = ()> = Result<T, Halt>;

// ---------------------------------------------------------------------------
// TraversalState
// ---------------------------------------------------------------------------

/// State shared by every root of one walk call.
pub(crate) struct TraversalState {
    collector: Mutex<Collector>,
    error:     Mutex<Option<WalkError>>,
    failed:    AtomicBool,
    files:     AtomicUsize,
    dirs:      AtomicUsize,
    symlinks:  AtomicUsize,
}

#[derive(Default)]
struct Collector {
    items:  Vec<Item>,
    unique: bool,
    keys:   HashSet<PathBuf>,
}

impl TraversalState {
    pub(crate) fn new(unique: bool) -> Self {
        Self {
            collector: Mutex::new(Collector {
                unique,
                ..Collector::default()
            }),
            error:    Mutex::new(None),
            failed:   AtomicBool::new(false),
            files:    AtomicUsize::new(0),
            dirs:     AtomicUsize::new(0),
            symlinks: AtomicUsize::new(0),
        }
    }

    /// Record `err` unless an earlier error already won.
    pub(crate) fn latch(&self, err: WalkError) {
        if let Ok(mut slot) = self.error.lock() {
            if slot.is_none() {
                debug!(error = %err, "walk failed");
                *slot = Some(err);
            }
        }
        self.failed.store(true, Ordering::Release);
    }

    pub(crate) fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    fn is_duplicate(&self, key: &Path) -> bool {
        match self.collector.lock() {
            Ok(c) => c.unique && c.keys.contains(key),
            Err(_) => false,
        }
    }

    fn append(&self, item: Item) {
        if let Ok(mut c) = self.collector.lock() {
            if c.unique && !c.keys.insert(item.path().to_path_buf()) {
                return;
            }
            c.items.push(item);
        }
    }

    /// Hand back the collected items, or the first fatal error.
    pub(crate) fn finish(&self, duration: Duration) -> Result<Results, WalkError> {
        if let Some(err) = self.error.lock().ok().and_then(|mut slot| slot.take()) {
            return Err(err);
        }
        if self.is_failed() {
            return Err(WalkError::Runtime("walk aborted".into()));
        }

        let items = self
            .collector
            .lock()
            .map(|mut c| std::mem::take(&mut c.items))
            .unwrap_or_default();

        let stats = ScanStats::compute(
            self.files.load(Ordering::Relaxed),
            self.dirs.load(Ordering::Relaxed),
            self.symlinks.load(Ordering::Relaxed),
            duration,
        );
        debug!(items = items.len(), files = stats.files, dirs = stats.dirs, "walk finished");
        Ok(Results { items, stats })
    }
}

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

/// What to do with a prepared child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visit {
    Dir,
    File,
    Skip,
}

/// One root's traversal, sharing a [`TraversalState`] with the other roots.
pub(crate) struct Walker {
    opts:             WalkOptions,
    cwd:              Arc<Path>,
    base:             Arc<Path>,
    mode:             OutputMode,
    include_symlinks: bool,
    follow:           bool,
    recurse:          bool,
    /// Canonical paths of directories entered under this root. Only kept
    /// while following symlinks, the one way a tree can loop back.
    entered:          Mutex<HashSet<PathBuf>>,
    pub(crate) state: Arc<TraversalState>,
}

impl Walker {
    /// Resolve `root` (and the configured base) to canonical absolute paths.
    ///
    /// A missing root is reported as [`WalkError::InvalidRoot`], as is a root
    /// that is not a directory.
    pub(crate) fn new(
        opts: WalkOptions,
        root: &Path,
        state: Arc<TraversalState>,
    ) -> Result<Self, WalkError> {
        let abs = absolute(root)?;
        let cwd = match opts.fs.realpath(&abs) {
            Ok(p) => p,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(WalkError::InvalidRoot(abs));
            }
            Err(e) => return Err(WalkError::io(abs, e)),
        };
        match opts.fs.lstat(&cwd) {
            Ok(EntryKind::Dir) => {}
            Ok(_) => return Err(WalkError::InvalidRoot(cwd)),
            Err(e) => return Err(WalkError::io(cwd, e)),
        }

        let base = match &opts.base {
            Some(b) => {
                let abs = absolute(b)?;
                opts.fs.realpath(&abs).unwrap_or(abs)
            }
            None => cwd.clone(),
        };
        trace!(cwd = %cwd.display(), base = %base.display(), "resolved root");

        let follow = opts.follow_symlinks();
        let mut entered = HashSet::new();
        if follow {
            entered.insert(cwd.clone());
        }

        Ok(Self {
            mode:             opts.output_mode(),
            include_symlinks: opts.include_symlinks(),
            follow,
            recurse:          opts.recurse_default(),
            entered:          Mutex::new(entered),
            cwd:              Arc::from(cwd),
            base:             Arc::from(base),
            opts,
            state,
        })
    }

    pub(crate) fn root_entry(&self) -> Entry {
        Entry::root(Arc::clone(&self.cwd), Arc::clone(&self.base))
    }

    pub(crate) fn halted(&self) -> bool {
        self.state.is_failed()
    }

    /// Route a failure through `on_error`. `Ok` means it was suppressed and
    /// the walk goes on without the failing entry.
    pub(crate) fn recover(&self, err: WalkError) -> Step {
        let action = match &self.opts.hooks.on_error {
            Some(on_error) => on_error(&err),
            None => ErrorAction::Abort,
        };
        match action {
            ErrorAction::Continue => {
                debug!(error = %err, "error suppressed by hook");
                Ok(())
            }
            ErrorAction::Abort => {
                self.state.latch(err);
                Err(Halt)
            }
        }
    }

    // ── Enumeration ───────────────────────────────────────────────────────

    /// List a directory. A root that vanished after it was resolved reads as
    /// empty.
    pub(crate) fn list(&self, path: &Path, root: bool) -> Result<Vec<RawEntry>, WalkError> {
        trace!(path = %path.display(), "listing");
        match self.opts.fs.read_dir(path) {
            Ok(raws) => Ok(raws),
            Err(e) if root && e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "root vanished");
                Ok(Vec::new())
            }
            Err(e) => Err(WalkError::io(path, e)),
        }
    }

    pub(crate) fn child(&self, parent: &Entry, raw: RawEntry) -> Entry {
        if raw.kind == EntryKind::Symlink {
            self.state.symlinks.fetch_add(1, Ordering::Relaxed);
        }
        Entry::child(parent, raw)
    }

    /// `on_each`, then `on_symbolic_link` for symlinks.
    pub(crate) fn decorate(&self, entry: &mut Entry) -> Result<(), WalkError> {
        self.run_hook(&self.opts.hooks.on_each, entry)?;
        if entry.is_symlink() {
            self.run_hook(&self.opts.hooks.on_symbolic_link, entry)?;
        }
        Ok(())
    }

    /// Resolve a symlink's target. Returns `false` for a broken link, which
    /// is dropped without error. Non-symlinks pass through untouched.
    pub(crate) fn resolve_link(&self, entry: &mut Entry) -> Result<bool, WalkError> {
        if !entry.is_symlink() {
            return Ok(true);
        }
        let fs = &self.opts.fs;
        let link = entry.path().to_path_buf();

        match fs.stat(&link) {
            Ok(kind) => entry.target = Some(kind),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %link.display(), "skipping broken symlink");
                return Ok(false);
            }
            Err(e) => return Err(WalkError::io(link, e)),
        }

        if self.opts.realpath || (self.follow && entry.is_dir()) {
            let real = match fs.realpath(&link) {
                Ok(real) => real,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %link.display(), "skipping broken symlink");
                    return Ok(false);
                }
                Err(e) => return Err(WalkError::io(link, e)),
            };
            if self.opts.realpath {
                entry.set_path(real.clone());
            }
            entry.real = Some(real);
        }

        entry.symlink = Some(link);
        Ok(true)
    }

    /// Directories are walked unless they are unfollowed symlinks, which are
    /// treated as leaves.
    pub(crate) fn classify(&self, entry: &Entry) -> Visit {
        let walkable = entry.is_dir() && (!entry.is_symlink() || self.follow);
        let (visit, skip) = if walkable {
            (Visit::Dir, &self.opts.skip_dir)
        } else {
            (Visit::File, &self.opts.skip_file)
        };
        match skip {
            Some(m) if m.is_match(entry) => Visit::Skip,
            _ => visit,
        }
    }

    // ── Visiting ──────────────────────────────────────────────────────────

    /// Run `on_directory`, emit the directory, and decide whether to descend.
    pub(crate) fn visit_dir(&self, dir: &mut Entry) -> Result<bool, WalkError> {
        self.state.dirs.fetch_add(1, Ordering::Relaxed);
        self.run_hook(&self.opts.hooks.on_directory, dir)?;
        self.push(dir)?;
        Ok(self.should_descend(dir))
    }

    /// Run `on_file` and emit the file.
    pub(crate) fn visit_file(&self, file: &mut Entry) -> Result<(), WalkError> {
        self.state.files.fetch_add(1, Ordering::Relaxed);
        self.run_hook(&self.opts.hooks.on_file, file)?;
        self.push(file)
    }

    fn run_hook(&self, hook: &Option<Hook>, entry: &mut Entry) -> Result<(), WalkError> {
        match hook {
            Some(hook) => hook(entry).map_err(|e| e.at(entry.path())),
            None => Ok(()),
        }
    }

    // ── Recursion ─────────────────────────────────────────────────────────

    fn should_descend(&self, dir: &mut Entry) -> bool {
        if dir.is_root() {
            return true;
        }

        match dir.recurse {
            Some(false) => return false,
            Some(true) => {}
            None => {
                if let Some(max) = self.opts.depth {
                    // children of this directory would land past the last level
                    if dir.depth() + 1 >= max {
                        dir.recurse = Some(false);
                        return false;
                    }
                }
                if !self.recurse {
                    return false;
                }
            }
        }

        if self.follow {
            if let Some(real) = &dir.real {
                if !self.first_visit(real) {
                    debug!(path = %dir.path().display(), real = %real.display(), "directory already walked, skipping");
                    return false;
                }
            }
        }
        true
    }

    /// Returns `false` when `real` was already entered from this root.
    fn first_visit(&self, real: &Path) -> bool {
        match self.entered.lock() {
            Ok(mut entered) => entered.insert(real.to_path_buf()),
            Err(_) => true,
        }
    }

    // ── Collection ────────────────────────────────────────────────────────

    fn push(&self, entry: &mut Entry) -> Result<(), WalkError> {
        if self.halted() || !self.accepts(entry) {
            return Ok(());
        }

        let formatted = match &self.opts.hooks.format {
            Some(format) => format(entry),
            None => None,
        };
        let custom = formatted.is_some();
        let item = formatted.unwrap_or_else(|| self.shape(entry));

        if self.state.is_duplicate(item.path()) {
            return Ok(());
        }

        let item = match &self.opts.hooks.on_push {
            Some(on_push) => {
                on_push(entry).map_err(|e| e.at(entry.path()))?;
                if entry.ignore || entry.keep == Some(false) {
                    return Ok(());
                }
                if custom { item } else { self.shape(entry) }
            }
            None => item,
        };

        if !self.halted() {
            self.state.append(item);
        }
        Ok(())
    }

    /// Drop rules, first match wins.
    fn accepts(&self, entry: &Entry) -> bool {
        if entry.ignore {
            return false;
        }
        if entry.is_root() || entry.path() == &*self.cwd {
            return false;
        }
        match entry.keep {
            Some(keep) => keep,
            None => self.passes_filters(entry),
        }
    }

    fn passes_filters(&self, entry: &Entry) -> bool {
        if entry.is_symlink() && !self.include_symlinks {
            return false;
        }
        if entry.is_dir() && self.opts.nodir {
            return false;
        }
        if !self.opts.dot && entry.name().starts_with('.') {
            return false;
        }
        if let Some(ignore) = &self.opts.ignore {
            if ignore.is_match(entry) {
                return false;
            }
        }
        match &self.opts.filter {
            Some(filter) => filter.is_match(entry),
            None => true,
        }
    }

    fn shape(&self, entry: &Entry) -> Item {
        match self.mode {
            OutputMode::Objects => Item::Entry(entry.clone()),
            OutputMode::Absolute => Item::Path(entry.path().to_path_buf()),
            OutputMode::Basename => Item::Path(PathBuf::from(entry.name())),
            OutputMode::Relative => Item::Path(entry.relative().to_path_buf()),
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf, WalkError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|e| WalkError::io(path, e))
}
