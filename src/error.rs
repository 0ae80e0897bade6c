use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Classified failure at a single filesystem site.
///
/// Scans and clears never return these to the caller as `Err`; they end up in
/// [`Measurement::skipped`](crate::utils::Measurement) or
/// [`ClearOutcome::failures`](crate::cleaner::ClearOutcome) so the cause stays
/// inspectable.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("{} vanished before it could be processed", path.display())]
    Vanished { path: PathBuf },

    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove {}: {source}", path.display())]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CacheError {
    /// Classify an I/O error hit while scanning `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => CacheError::Vanished { path },
            io::ErrorKind::PermissionDenied => CacheError::PermissionDenied { path },
            _ => CacheError::Io { path, source: err },
        }
    }

    /// Classify an I/O error hit while deleting `path`.
    ///
    /// A missing entry is still reported as `Vanished` so callers can treat the
    /// race as a no-op.
    pub fn from_remove(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            return CacheError::Vanished {
                path: path.to_path_buf(),
            };
        }
        CacheError::RemoveFailed {
            path: path.to_path_buf(),
            source: err,
        }
    }

    /// Convert a walkdir error, keeping the path walkdir was looking at.
    pub fn from_walk(fallback: &Path, err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| fallback.to_path_buf());
        match err.into_io_error() {
            Some(io_err) => CacheError::from_io(&path, io_err),
            None => CacheError::Io {
                path,
                source: io::Error::other("filesystem loop detected"),
            },
        }
    }

    /// Entry disappeared between listing and use. Never counts as a failure.
    pub fn is_vanished(&self) -> bool {
        matches!(self, CacheError::Vanished { .. })
    }

    pub fn path(&self) -> &Path {
        match self {
            CacheError::Vanished { path }
            | CacheError::PermissionDenied { path }
            | CacheError::Io { path, .. }
            | CacheError::RootUnreadable { path, .. }
            | CacheError::RemoveFailed { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_scan_errors_by_kind() {
        let p = Path::new("/tmp/x");
        let e = CacheError::from_io(p, io::Error::from(io::ErrorKind::NotFound));
        assert!(e.is_vanished());

        let e = CacheError::from_io(p, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(e, CacheError::PermissionDenied { .. }));

        let e = CacheError::from_io(p, io::Error::other("boom"));
        assert!(matches!(e, CacheError::Io { .. }));
        assert_eq!(e.path(), p);
    }

    #[test]
    fn remove_errors_keep_vanished_distinct() {
        let p = Path::new("/tmp/y");
        let e = CacheError::from_remove(p, io::Error::from(io::ErrorKind::NotFound));
        assert!(e.is_vanished());

        let e = CacheError::from_remove(p, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(e, CacheError::RemoveFailed { .. }));
        assert!(e.to_string().starts_with("failed to remove /tmp/y"));
    }
}
