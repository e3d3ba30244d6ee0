use std::cell::OnceCell;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// A single filesystem node visited during a walk.
///
/// Hooks receive `&mut Entry` and may rewrite its path or set the advisory
/// flags (`keep`, `ignore`, `recurse`). Derived fields (`name`, `dirname`,
/// `relative`, `extname`, `stem`) are computed on first access and cached;
/// [`set_path`](Entry::set_path) drops the cache so reads never go stale.
#[derive(Debug, Clone)]
pub struct Entry {
    path:      PathBuf,
    orig_path: PathBuf,
    base:      Arc<Path>,
    cwd:       Arc<Path>,
    depth:     usize,
    kind:      EntryKind,
    root:      bool,

    /// Kind of the symlink target, once stat'ed.
    pub(crate) target: Option<EntryKind>,
    /// Canonical path of a directory, used for cycle detection. Derived from
    /// the parent for plain directories, resolved for symlinked ones.
    pub(crate) real:   Option<PathBuf>,

    /// `Some(true)` forces inclusion past every filter, `Some(false)` forces
    /// exclusion, `None` defers to the configured filters.
    pub keep: Option<bool>,

    /// Exclude unconditionally. Unlike `keep = Some(false)` this also skips
    /// matcher invocation.
    pub ignore: bool,

    /// Per-directory descent override. `Some(true)` descends even past the
    /// depth limit; `Some(false)` never descends.
    pub recurse: Option<bool>,

    /// Original path of the symlink this entry was reached through. Inherited
    /// by everything beneath a followed symlinked directory.
    pub symlink: Option<PathBuf>,

    derived: OnceCell<Derived>,
}

#[derive(Debug, Clone)]
struct Derived {
    name:     String,
    dirname:  PathBuf,
    relative: PathBuf,
}

/// The kind of a traversed entry, as reported without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// A symbolic link.
    Symlink,

    /// Anything else (device files, pipes, sockets, etc.).
    Other,
}

impl EntryKind {
    /// Map a `std::fs::FileType` to an `EntryKind`.
    pub fn from_file_type(ft: std::fs::FileType) -> Self {
        if ft.is_symlink() {
            EntryKind::Symlink
        } else if ft.is_dir() {
            EntryKind::Dir
        } else if ft.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        }
    }
}

/// One child as returned by [`FileSystem::read_dir`](crate::FileSystem::read_dir).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub name: OsString,
    pub kind: EntryKind,
}

impl RawEntry {
    pub fn new(name: impl Into<OsString>, kind: EntryKind) -> Self {
        Self { name: name.into(), kind }
    }
}

impl Entry {
    /// The synthetic entry for a traversal root.
    pub(crate) fn root(cwd: Arc<Path>, base: Arc<Path>) -> Self {
        let mut entry = Self::build(cwd.to_path_buf(), cwd, base, 0, EntryKind::Dir, true);
        entry.real = Some(entry.path.clone());
        entry
    }

    /// A child of `parent`, as listed by the filesystem.
    pub(crate) fn child(parent: &Entry, raw: RawEntry) -> Self {
        let depth = if parent.root { 0 } else { parent.depth + 1 };
        let path = parent.path.join(&raw.name);
        let real = match raw.kind {
            EntryKind::Dir => parent.real.as_ref().map(|r| r.join(&raw.name)),
            _ => None,
        };
        let mut entry = Self::build(
            path,
            Arc::clone(&parent.cwd),
            Arc::clone(&parent.base),
            depth,
            raw.kind,
            false,
        );
        entry.symlink = parent.symlink.clone();
        entry.real = real;
        entry
    }

    fn build(
        path: PathBuf,
        cwd: Arc<Path>,
        base: Arc<Path>,
        depth: usize,
        kind: EntryKind,
        root: bool,
    ) -> Self {
        Self {
            orig_path: path.clone(),
            path,
            base,
            cwd,
            depth,
            kind,
            root,
            target:  None,
            real:    None,
            keep:    None,
            ignore:  false,
            recurse: None,
            symlink: None,
            derived: OnceCell::new(),
        }
    }

    // ── Path ──────────────────────────────────────────────────────────────

    /// Current absolute path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the path. Derived fields are recomputed on next access.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if path != self.path {
            self.path = path;
            self.derived.take();
        }
    }

    /// Replace the base name, keeping the parent directory.
    pub fn set_name(&mut self, name: impl AsRef<Path>) {
        let path = self.dirname().join(name);
        self.set_path(path);
    }

    /// The path this entry had when it was listed, before any rewrite.
    pub fn original_path(&self) -> &Path {
        &self.orig_path
    }

    /// Base name of the current path.
    pub fn name(&self) -> &str {
        &self.derived().name
    }

    /// Parent directory of the current path.
    pub fn dirname(&self) -> &Path {
        &self.derived().dirname
    }

    /// Current path relative to [`base`](Entry::base).
    pub fn relative(&self) -> &Path {
        &self.derived().relative
    }

    /// Extension including the leading dot, or an empty string.
    ///
    /// Dotfiles like `.gitignore` have no extension.
    pub fn extname(&self) -> String {
        self.path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default()
    }

    /// Base name without its extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn derived(&self) -> &Derived {
        self.derived.get_or_init(|| Derived {
            name: self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            dirname: self
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            relative: relative_path(&self.base, &self.path),
        })
    }

    // ── Context ───────────────────────────────────────────────────────────

    /// Distance from the root's direct children, which are depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The path relative results are computed against.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// The traversal root this entry was found under.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Whether this is the synthetic entry for the traversal root.
    pub fn is_root(&self) -> bool {
        self.root
    }

    // ── Kind ──────────────────────────────────────────────────────────────

    /// Kind as listed, without following symlinks.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Kind of the symlink target, when it has been resolved.
    pub fn target_kind(&self) -> Option<EntryKind> {
        self.target
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }

    /// True for directories, and for symlinks whose target is a directory.
    pub fn is_dir(&self) -> bool {
        self.resolved_kind() == EntryKind::Dir
    }

    /// True for regular files, and for symlinks whose target is a file.
    pub fn is_file(&self) -> bool {
        self.resolved_kind() == EntryKind::File
    }

    fn resolved_kind(&self) -> EntryKind {
        match (self.kind, self.target) {
            (EntryKind::Symlink, Some(target)) => target,
            (kind, _) => kind,
        }
    }
}

/// Express `path` relative to `base`, climbing with `..` when `path` is not
/// below `base`. Both are expected to be absolute.
pub(crate) fn relative_path(base: &Path, path: &Path) -> PathBuf {
    if let Ok(rel) = path.strip_prefix(base) {
        return rel.to_path_buf();
    }

    let base: Vec<Component<'_>> = base.components().collect();
    let path: Vec<Component<'_>> = path.components().collect();
    let common = base
        .iter()
        .zip(path.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base.len() {
        rel.push("..");
    }
    for component in &path[common..] {
        rel.push(component.as_os_str());
    }
    rel
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_at(cwd: &str, base: &str) -> Entry {
        Entry::root(Arc::from(Path::new(cwd)), Arc::from(Path::new(base)))
    }

    #[test]
    fn children_start_at_depth_zero() {
        let root = root_at("/r", "/r");
        let a = Entry::child(&root, RawEntry::new("a", EntryKind::Dir));
        let b = Entry::child(&a, RawEntry::new("b", EntryKind::File));
        assert_eq!(a.depth(), 0);
        assert_eq!(b.depth(), 1);
        assert_eq!(b.path(), Path::new("/r/a/b"));
        assert_eq!(b.relative(), Path::new("a/b"));
    }

    #[test]
    fn set_path_invalidates_derived_fields() {
        let root = root_at("/r", "/r");
        let mut file = Entry::child(&root, RawEntry::new("notes.md", EntryKind::File));
        assert_eq!(file.name(), "notes.md");
        assert_eq!(file.relative(), Path::new("notes.md"));

        file.set_path("/r/sub/todo.txt");
        assert_eq!(file.name(), "todo.txt");
        assert_eq!(file.dirname(), Path::new("/r/sub"));
        assert_eq!(file.relative(), Path::new("sub/todo.txt"));
        assert_eq!(file.original_path(), Path::new("/r/notes.md"));
    }

    #[test]
    fn set_name_keeps_parent() {
        let root = root_at("/r", "/r");
        let mut file = Entry::child(&root, RawEntry::new("a.js", EntryKind::File));
        file.set_name("b.js");
        assert_eq!(file.path(), Path::new("/r/b.js"));
        assert_eq!(file.stem(), "b");
        assert_eq!(file.extname(), ".js");
    }

    #[test]
    fn extname_of_dotfile_is_empty() {
        let root = root_at("/r", "/r");
        let file = Entry::child(&root, RawEntry::new(".gitignore", EntryKind::File));
        assert_eq!(file.extname(), "");
        assert_eq!(file.stem(), ".gitignore");
    }

    #[test]
    fn relative_climbs_out_of_base() {
        assert_eq!(
            relative_path(Path::new("/a/b/c"), Path::new("/a/x/y")),
            PathBuf::from("../../x/y")
        );
        assert_eq!(
            relative_path(Path::new("/a"), Path::new("/a/b")),
            PathBuf::from("b")
        );
        assert_eq!(relative_path(Path::new("/a"), Path::new("/a")), PathBuf::new());
    }

    #[test]
    fn symlink_kind_resolves_through_target() {
        let root = root_at("/r", "/r");
        let mut link = Entry::child(&root, RawEntry::new("link", EntryKind::Symlink));
        assert!(link.is_symlink());
        assert!(!link.is_dir());

        link.target = Some(EntryKind::Dir);
        assert!(link.is_symlink());
        assert!(link.is_dir());
    }

    #[test]
    fn directories_carry_their_canonical_path() {
        let root = root_at("/r", "/r");
        let mut link = Entry::child(&root, RawEntry::new("link", EntryKind::Symlink));
        assert_eq!(link.real, None);

        link.real = Some(PathBuf::from("/elsewhere"));
        let inner = Entry::child(&link, RawEntry::new("sub", EntryKind::Dir));
        let file = Entry::child(&link, RawEntry::new("f.txt", EntryKind::File));
        assert_eq!(inner.path(), Path::new("/r/link/sub"));
        assert_eq!(inner.real.as_deref(), Some(Path::new("/elsewhere/sub")));
        assert_eq!(file.real, None);

        let plain = Entry::child(&root, RawEntry::new("a", EntryKind::Dir));
        assert_eq!(plain.real.as_deref(), Some(Path::new("/r/a")));
    }

    #[test]
    fn symlink_origin_is_inherited() {
        let root = root_at("/r", "/r");
        let mut link = Entry::child(&root, RawEntry::new("link", EntryKind::Symlink));
        link.symlink = Some(PathBuf::from("/r/link"));
        let inner = Entry::child(&link, RawEntry::new("x", EntryKind::File));
        assert_eq!(inner.symlink.as_deref(), Some(Path::new("/r/link")));
    }
}
