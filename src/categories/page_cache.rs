use std::fs;
use std::io;
use std::path::PathBuf;

use crate::cleaner::{ClearOutcome, Cleaner};
use crate::error::CacheError;
use crate::region::RegionKind;
use crate::utils::{self, Measurement};

pub struct FrameworkPageCache {
    path: PathBuf,
}

impl FrameworkPageCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn not_found(&self) -> ClearOutcome {
        ClearOutcome::succeeded(self.region(), 0, 0, "no framework cache found".to_string())
    }
}

impl Cleaner for FrameworkPageCache {
    fn region(&self) -> RegionKind {
        RegionKind::FrameworkPageCache
    }

    fn measure(&self) -> Measurement {
        utils::measure_dir(&self.path)
    }

    fn exists(&self) -> bool {
        utils::is_real_dir(&self.path)
    }

    /// Removes the whole cache directory in one subtree deletion.
    fn clear(&self) -> ClearOutcome {
        match self.path.symlink_metadata() {
            Err(e) if e.kind() == io::ErrorKind::NotFound => return self.not_found(),
            Err(e) => {
                let err = CacheError::from_io(&self.path, e);
                return ClearOutcome::failed(self.region(), 0, 0, err.to_string(), vec![err]);
            }
            Ok(meta) if !meta.is_dir() => {
                let reason = if meta.file_type().is_symlink() {
                    "symbolic link, not followed"
                } else {
                    "not a directory"
                };
                let err = CacheError::RemoveFailed {
                    path: self.path.clone(),
                    source: io::Error::other(reason),
                };
                return ClearOutcome::failed(self.region(), 0, 0, err.to_string(), vec![err]);
            }
            Ok(_) => {}
        }

        let items = utils::count_entries(&self.path);
        let bytes = utils::dir_size(&self.path);

        match fs::remove_dir_all(&self.path) {
            Ok(()) => ClearOutcome::succeeded(
                self.region(),
                items,
                bytes,
                "framework cache cleared".to_string(),
            ),
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.not_found(),
            Err(e) => {
                let remaining = utils::count_entries(&self.path);
                let freed = bytes.saturating_sub(utils::dir_size(&self.path));
                let err = CacheError::from_remove(&self.path, e);
                ClearOutcome::failed(
                    self.region(),
                    items.saturating_sub(remaining),
                    freed,
                    err.to_string(),
                    vec![err],
                )
            }
        }
    }
}
