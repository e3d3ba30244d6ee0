use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalkError {
    // Arguments
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid starting directory: {}", .0.display())]
    InvalidRoot(PathBuf),

    // Traversal
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Hooks
    #[error("hook failed at {}: {message}", path.display())]
    Hook { path: PathBuf, message: String },

    // Runtime
    #[error("walk task failed: {0}")]
    Runtime(String),
}

impl WalkError {
    /// Wrap an I/O error with the path it occurred at, keeping the common
    /// kinds as their own variants.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io { path, source },
        }
    }

    /// An error raised from inside a hook. The engine fills in the path of
    /// the entry the hook was running on.
    pub fn hook(message: impl Into<String>) -> Self {
        Self::Hook {
            path: PathBuf::new(),
            message: message.into(),
        }
    }

    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::InvalidRoot(p)
            | Self::PermissionDenied(p)
            | Self::NotFound(p)
            | Self::Io { path: p, .. }
            | Self::Hook { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether this is a not-found failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidRoot(_))
    }

    /// Attach `path` to a hook error that was raised without one.
    pub(crate) fn at(self, at: &Path) -> Self {
        match self {
            Self::Hook { path, message } if path.as_os_str().is_empty() => Self::Hook {
                path: at.to_path_buf(),
                message,
            },
            other => other,
        }
    }
}

/// What the `on_error` hook wants done with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorAction {
    /// Drop the failing entry (and its subtree) and keep walking.
    Continue,

    /// Stop the walk and surface the error.
    #[default]
    Abort,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_maps_common_kinds() {
        let err = WalkError::io(
            "/x",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, WalkError::PermissionDenied(_)));

        let err = WalkError::io("/x", std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.is_not_found());
        assert_eq!(err.path(), Some(Path::new("/x")));
    }

    #[test]
    fn hook_errors_pick_up_the_entry_path() {
        let err = WalkError::hook("nope").at(Path::new("/r/a"));
        assert_eq!(err.path(), Some(Path::new("/r/a")));
        assert!(err.to_string().contains("nope"));

        let err = WalkError::NotFound("/r/b".into()).at(Path::new("/r/a"));
        assert_eq!(err.path(), Some(Path::new("/r/b")));
    }

    #[test]
    fn invalid_root_message() {
        let err = WalkError::InvalidRoot("/missing".into());
        assert_eq!(err.to_string(), "invalid starting directory: /missing");
    }
}
