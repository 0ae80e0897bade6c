use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::CacheError;

pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Result of a best-effort directory walk.
#[derive(Debug, Default)]
pub struct Measurement {
    pub bytes: u64,
    pub files: u64,
    /// Entries the walk could not read. The totals are a lower bound when this
    /// is non-empty.
    pub skipped: Vec<CacheError>,
}

impl Measurement {
    pub fn size_mb(&self) -> f64 {
        bytes_to_mb(self.bytes)
    }

    /// Record an entry the walk had to skip.
    pub(crate) fn skip(&mut self, err: CacheError) {
        debug!(path = %err.path().display(), error = %err, "skipping entry");
        self.skipped.push(err);
    }
}

/// Walk `path` recursively and total the size of every regular file.
///
/// Symlinks are never followed and contribute nothing, `path` itself
/// included. A missing `path` measures as empty.
pub fn measure_dir(path: &Path) -> Measurement {
    let mut measurement = Measurement::default();

    match path.symlink_metadata() {
        Ok(meta) if meta.file_type().is_symlink() => return measurement,
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return measurement,
        Err(e) => {
            measurement.skip(CacheError::from_io(path, e));
            return measurement;
        }
    }

    for entry in WalkDir::new(path)
        .follow_links(false)
        .follow_root_links(false)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                measurement.skip(CacheError::from_walk(path, e));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.metadata() {
            Ok(meta) => {
                measurement.bytes += meta.len();
                measurement.files += 1;
            }
            Err(e) => measurement.skip(CacheError::from_walk(entry.path(), e)),
        }
    }

    measurement
}

/// Compute total size of a directory recursively, in bytes.
pub fn dir_size(path: &Path) -> u64 {
    measure_dir(path).bytes
}

/// Total size of a directory in megabytes, rounded to two decimals.
/// `0.0` when the path is missing or unreadable.
pub fn directory_size_mb(path: &Path) -> f64 {
    bytes_to_mb(dir_size(path))
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}

/// Render a megabyte figure as `"2.0 MB"`, `"1.25 MB"`, `"0.0 MB"`.
pub fn format_mb(mb: f64) -> String {
    if mb.fract() == 0.0 {
        format!("{mb:.1} MB")
    } else {
        format!("{mb} MB")
    }
}

/// Count every entry (files, directories, links) under `path`, `path` included.
pub fn count_entries(path: &Path) -> u64 {
    WalkDir::new(path)
        .follow_links(false)
        .follow_root_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .count() as u64
}

/// A directory at `path` itself, not a link to one.
pub fn is_real_dir(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

/// Size of a single entry without following links.
pub fn entry_size(path: &Path) -> u64 {
    match path.symlink_metadata() {
        Ok(meta) if meta.is_dir() => dir_size(path),
        Ok(meta) if meta.is_file() => meta.len(),
        _ => 0,
    }
}

/// Remove a file, link or directory tree. Returns bytes freed on success.
pub fn safe_remove(path: &Path) -> Result<u64, CacheError> {
    let meta = path
        .symlink_metadata()
        .map_err(|e| CacheError::from_remove(path, e))?;
    let size = entry_size(path);
    let removed = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    removed.map_err(|e| CacheError::from_remove(path, e))?;
    Ok(size)
}

/// Format byte count as human-readable string.
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.2} GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.2} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1_024 {
        format!("{:.2} KB", bytes as f64 / 1_024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Shorten a path for display by replacing home dir with ~.
pub fn display_path(path: &Path) -> String {
    let home: Option<PathBuf> = dirs::home_dir();
    match home.as_deref().and_then(|h| path.strip_prefix(h).ok()) {
        Some(relative) => format!("~/{}", relative.display()),
        None => path.display().to_string(),
    }
}
