use std::io;
use std::path::{Path, PathBuf};

use crate::entry::{Entry, EntryKind, RawEntry};

/// The filesystem the engine reads from.
///
/// Implement this to walk anything shaped like a directory tree: an
/// in-memory fixture, an archive, a remote mount. [`StdFileSystem`] is the
/// default and wraps `std::fs`.
///
/// # Blocking
///
/// Methods are blocking. The synchronous walker calls them inline; the async
/// walker runs each call on tokio's blocking pool, so implementations never
/// need to be async themselves.
///
/// # Thread Safety
///
/// `Send + Sync` are required: the async walker shares one filesystem across
/// concurrently running directory tasks.
///
/// [`StdFileSystem`]: crate::StdFileSystem
pub trait FileSystem: Send + Sync {
    /// List the immediate children of `path`, classified without following
    /// symlinks. Order is whatever the underlying listing provides.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<RawEntry>>;

    /// Kind of `path`, following symlinks.
    fn stat(&self, path: &Path) -> io::Result<EntryKind>;

    /// Kind of `path` itself, not following a final symlink.
    fn lstat(&self, path: &Path) -> io::Result<EntryKind>;

    /// Canonical absolute path. Fails with `NotFound` when the target is
    /// missing.
    fn realpath(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Determines whether an entry is kept.
///
/// Implemented for closures, [`regex::Regex`], [`Name`](crate::matcher::Name)
/// and lists of matchers (any-of). Write your own for anything else.
///
/// # Example
///
/// ```rust
/// use readwalk::{Matcher, Entry};
///
/// struct ExtensionMatcher(&'static str);
///
/// impl Matcher for ExtensionMatcher {
///     fn is_match(&self, entry: &Entry) -> bool {
///         entry.extname() == self.0
///     }
/// }
/// ```
pub trait Matcher: Send + Sync {
    /// Returns `true` if this entry matches.
    fn is_match(&self, entry: &Entry) -> bool;
}
