use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tracing::debug;

use crate::cleaner::{ClearOutcome, Cleaner};
use crate::error::CacheError;
use crate::region::RegionKind;
use crate::utils::{self, Measurement};

/// Entries older than this are stale upload leftovers.
pub const DEFAULT_STALE_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Upload staging directory. Only its direct child files are cleared.
pub struct TempUploads {
    path: PathBuf,
}

impl TempUploads {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open the staging directory. A link in its place is refused rather
    /// than followed.
    fn read_dir(&self) -> Result<Option<fs::ReadDir>, CacheError> {
        let unreadable = |source: io::Error| CacheError::RootUnreadable {
            path: self.path.clone(),
            source,
        };
        match self.path.symlink_metadata() {
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(unreadable(e)),
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(unreadable(io::Error::other("symbolic link, not followed")))
            }
            Ok(meta) if !meta.is_dir() => {
                return Err(unreadable(io::Error::other("not a directory")))
            }
            Ok(_) => {}
        }
        match fs::read_dir(&self.path) {
            Ok(rd) => Ok(Some(rd)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unreadable(e)),
        }
    }

    /// Remove direct children (files or directories) last modified more than
    /// `max_age` ago.
    pub fn clear_stale(&self, max_age: Duration) -> ClearOutcome {
        self.clear_stale_at(max_age, SystemTime::now())
    }

    pub fn clear_stale_at(&self, max_age: Duration, now: SystemTime) -> ClearOutcome {
        let read_dir = match self.read_dir() {
            Ok(Some(rd)) => rd,
            Ok(None) => {
                return ClearOutcome::succeeded(self.region(), 0, 0, stale_message(0, 0));
            }
            Err(e) => return ClearOutcome::failed(self.region(), 0, 0, e.to_string(), vec![e]),
        };

        let mut removed = 0u64;
        let mut freed = 0u64;
        let mut failures = Vec::new();

        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    failures.push(CacheError::from_io(&self.path, e));
                    continue;
                }
            };
            let path = entry.path();
            let modified = match entry.metadata().and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    let err = CacheError::from_io(&path, e);
                    if !err.is_vanished() {
                        failures.push(err);
                    }
                    continue;
                }
            };
            // Future timestamps read as an error here; keep those.
            let is_stale = now
                .duration_since(modified)
                .map(|age| age > max_age)
                .unwrap_or(false);
            if !is_stale {
                continue;
            }

            match utils::safe_remove(&path) {
                Ok(size) => {
                    removed += 1;
                    freed += size;
                }
                Err(err) if err.is_vanished() => debug!(path = %path.display(), "already gone"),
                Err(err) => failures.push(err),
            }
        }

        let message = stale_message(removed, freed);
        if failures.is_empty() {
            ClearOutcome::succeeded(self.region(), removed, freed, message)
        } else {
            let message = format!("{message}, {} failed: {}", failures.len(), failures[0]);
            ClearOutcome::failed(self.region(), removed, freed, message, failures)
        }
    }
}

fn stale_message(removed: u64, freed: u64) -> String {
    format!(
        "{removed} stale entries removed ({} freed)",
        utils::format_size(freed)
    )
}

impl Cleaner for TempUploads {
    fn region(&self) -> RegionKind {
        RegionKind::TempUploads
    }

    fn measure(&self) -> Measurement {
        utils::measure_dir(&self.path)
    }

    fn exists(&self) -> bool {
        utils::is_real_dir(&self.path)
    }

    /// Non-recursive: subdirectories and links are left alone.
    fn clear(&self) -> ClearOutcome {
        let read_dir = match self.read_dir() {
            Ok(Some(rd)) => rd,
            Ok(None) => {
                return ClearOutcome::succeeded(self.region(), 0, 0, "0 files removed".to_string());
            }
            Err(e) => return ClearOutcome::failed(self.region(), 0, 0, e.to_string(), vec![e]),
        };

        let mut removed = 0u64;
        let mut freed = 0u64;
        let mut failures = Vec::new();

        for entry in read_dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    failures.push(CacheError::from_io(&self.path, e));
                    continue;
                }
            };
            let path = entry.path();
            match entry.file_type() {
                Ok(ft) if ft.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    let err = CacheError::from_io(&path, e);
                    if !err.is_vanished() {
                        failures.push(err);
                    }
                    continue;
                }
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            match fs::remove_file(&path) {
                Ok(()) => {
                    removed += 1;
                    freed += size;
                }
                Err(e) => {
                    let err = CacheError::from_remove(&path, e);
                    if err.is_vanished() {
                        debug!(path = %path.display(), "already gone");
                    } else {
                        failures.push(err);
                    }
                }
            }
        }

        if failures.is_empty() {
            ClearOutcome::succeeded(self.region(), removed, freed, format!("{removed} files removed"))
        } else {
            let message = format!(
                "{removed} files removed, {} failed: {}",
                failures.len(),
                failures[0]
            );
            ClearOutcome::failed(self.region(), removed, freed, message, failures)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn staging() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let temp = dir.path().join("static/uploads/temp");
        fs::create_dir_all(&temp).unwrap();
        (dir, temp)
    }

    #[test]
    fn removes_only_direct_child_files() {
        let (_dir, temp) = staging();
        fs::write(temp.join("a.upload"), vec![0u8; 10]).unwrap();
        fs::write(temp.join("b.upload"), vec![0u8; 20]).unwrap();
        fs::create_dir_all(temp.join("batch")).unwrap();
        fs::write(temp.join("batch/c.upload"), vec![0u8; 30]).unwrap();

        let outcome = TempUploads::new(&temp).clear();
        assert!(outcome.success);
        assert_eq!(outcome.items_removed, 2);
        assert_eq!(outcome.bytes_freed, 30);
        assert_eq!(outcome.message, "2 files removed");
        assert!(!temp.join("a.upload").exists());
        assert!(temp.join("batch/c.upload").exists());
        assert!(temp.is_dir());
    }

    #[test]
    fn missing_directory_removes_nothing() {
        let dir = TempDir::new().unwrap();
        let outcome = TempUploads::new(dir.path().join("absent")).clear();
        assert!(outcome.success);
        assert_eq!(outcome.items_removed, 0);
    }

    #[cfg(unix)]
    #[test]
    fn leaves_symlinks_alone() {
        let (dir, temp) = staging();
        let target = dir.path().join("precious");
        fs::write(&target, b"keep").unwrap();
        std::os::unix::fs::symlink(&target, temp.join("link")).unwrap();

        let outcome = TempUploads::new(&temp).clear();
        assert_eq!(outcome.items_removed, 0);
        assert!(temp.join("link").symlink_metadata().is_ok());
        assert!(target.exists());
    }

    #[cfg(unix)]
    #[test]
    fn linked_staging_dir_is_refused() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("precious"), b"keep").unwrap();

        let dir = TempDir::new().unwrap();
        let temp = dir.path().join("static/uploads/temp");
        fs::create_dir_all(temp.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(outside.path(), &temp).unwrap();

        let cleaner = TempUploads::new(&temp);
        assert!(!cleaner.exists());
        assert_eq!(cleaner.measure().bytes, 0);

        let outcome = cleaner.clear();
        assert!(!outcome.success);
        assert_eq!(outcome.items_removed, 0);
        assert!(outcome.message.contains("symbolic link"));
        assert!(matches!(
            outcome.failures.as_slice(),
            [CacheError::RootUnreadable { .. }]
        ));

        let later = SystemTime::now() + Duration::from_secs(7 * 24 * 60 * 60);
        assert!(!cleaner.clear_stale_at(DEFAULT_STALE_AGE, later).success);
        assert!(outside.path().join("precious").exists());
    }

    #[test]
    fn plain_file_in_place_of_staging_dir_fails() {
        let dir = TempDir::new().unwrap();
        let temp = dir.path().join("temp");
        fs::write(&temp, b"not a dir").unwrap();

        let outcome = TempUploads::new(&temp).clear();
        assert!(!outcome.success);
        assert!(outcome.message.contains("not a directory"));
        assert!(matches!(
            outcome.failures.as_slice(),
            [CacheError::RootUnreadable { .. }]
        ));
        assert!(temp.is_file());
    }

    #[test]
    fn stale_cleanup_keeps_recent_entries() {
        let (_dir, temp) = staging();
        fs::write(temp.join("fresh"), b"new").unwrap();

        let outcome = TempUploads::new(&temp).clear_stale(DEFAULT_STALE_AGE);
        assert!(outcome.success);
        assert_eq!(outcome.items_removed, 0);
        assert!(temp.join("fresh").exists());
    }

    #[test]
    fn stale_cleanup_removes_old_files_and_dirs() {
        let (_dir, temp) = staging();
        fs::write(temp.join("old"), vec![0u8; 40]).unwrap();
        fs::create_dir_all(temp.join("old-batch")).unwrap();
        fs::write(temp.join("old-batch/part"), vec![0u8; 60]).unwrap();

        let later = SystemTime::now() + Duration::from_secs(2 * 24 * 60 * 60);
        let outcome = TempUploads::new(&temp).clear_stale_at(DEFAULT_STALE_AGE, later);
        assert!(outcome.success);
        assert_eq!(outcome.items_removed, 2);
        assert_eq!(outcome.bytes_freed, 100);
        assert_eq!(fs::read_dir(&temp).unwrap().count(), 0);
    }
}
