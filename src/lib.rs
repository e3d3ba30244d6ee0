//! # readwalk
//!
//! Configurable recursive directory reading with hooks, symlink policy, sync
//! and async.
//!
//! readwalk walks one or more directories and returns a flat list of paths
//! (relative, absolute, or base names) or full [`Entry`] values. Hooks see
//! every entry as it is visited and can keep, drop, rename, or prune it.
//! The filesystem itself is a [`FileSystem`] trait object, so anything shaped
//! like a directory tree can be walked.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! let results = readwalk::readdir("src")
//!     .recursive(true)
//!     .nodir(true)
//!     .run()
//!     .unwrap();
//!
//! for path in results.paths() {
//!     println!("{}", path.display());
//! }
//! ```
//!
//! # Hooks
//!
//! Hooks get `&mut Entry` and steer the walk through its advisory flags:
//!
//! ```rust,no_run
//! let markdown = readwalk::readdir("docs")
//!     .recursive(true)
//!     .nodir(true)
//!     .on_directory(|dir| {
//!         if dir.name() == "vendor" {
//!             dir.recurse = Some(false);
//!         }
//!         Ok(())
//!     })
//!     .on_file(|file| {
//!         file.keep = Some(file.extname() == ".md");
//!         Ok(())
//!     })
//!     .run()
//!     .unwrap();
//! ```
//!
//! # Async
//!
//! [`WalkBuilder::run_async`] (or [`walk`]) walks sibling directories
//! concurrently on the current tokio runtime. Every directory still appears
//! before its descendants; unrelated branches may interleave.
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), readwalk::WalkError> {
//! let results = readwalk::readdir(["a", "b"])
//!     .recursive(true)
//!     .unique(true)
//!     .run_async()
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod matcher;

mod builder;
mod engine;
mod entry;
mod error;
mod fs;
mod options;
mod results;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::WalkBuilder;
pub use entry::{Entry, EntryKind, RawEntry};
pub use error::{ErrorAction, WalkError};
pub use fs::StdFileSystem;
pub use options::{ErrorHook, FormatHook, Hook, Hooks, OutputMode, Roots, WalkOptions};
pub use results::{Item, Results, ScanStats};
pub use traits::{FileSystem, Matcher};

// ── Entry points ──────────────────────────────────────────────────────────────

/// Create a [`WalkBuilder`] for one root or a list of roots.
///
/// # Example
///
/// ```rust,no_run
/// let results = readwalk::readdir("src").depth(2).run().unwrap();
/// assert!(results.paths().iter().all(|p| p.components().count() <= 2));
/// ```
pub fn readdir(roots: impl Into<Roots>) -> WalkBuilder {
    WalkBuilder::new(roots)
}

/// Walk `roots` on the calling thread.
///
/// # Errors
///
/// [`WalkError::InvalidArgument`] for an empty root list,
/// [`WalkError::InvalidRoot`] for a missing starting directory, and the
/// first fatal traversal or hook error otherwise.
pub fn walk_sync(roots: impl Into<Roots>, options: &WalkOptions) -> Result<Results, WalkError> {
    engine::blocking::run(roots.into(), options)
}

/// Walk `roots` on the current tokio runtime.
///
/// Must be called from within a runtime; filesystem calls run on its
/// blocking pool.
///
/// # Errors
///
/// Same as [`walk_sync`].
pub async fn walk(roots: impl Into<Roots>, options: &WalkOptions) -> Result<Results, WalkError> {
    engine::concurrent::run(roots.into(), options).await
}
