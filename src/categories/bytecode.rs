use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::cleaner::{ClearOutcome, Cleaner};
use crate::config::RegionLayout;
use crate::error::CacheError;
use crate::region::RegionKind;
use crate::utils::{self, Measurement};

/// Interpreter bytecode scattered across the application tree: compiled
/// files by suffix and whole bytecode cache directories by name.
pub struct SystemBytecode {
    root: PathBuf,
    layout: RegionLayout,
}

enum Artifact {
    File(PathBuf),
    Dir(PathBuf),
}

/// Entries removed from one bytecode directory tree.
#[derive(Default)]
struct Removal {
    items: u64,
    bytes: u64,
    failures: Vec<CacheError>,
}

impl Removal {
    fn record_failure(&mut self, err: CacheError) {
        if err.is_vanished() {
            debug!(path = %err.path().display(), "already gone");
        } else {
            self.failures.push(err);
        }
    }
}

impl SystemBytecode {
    pub fn new(root: impl Into<PathBuf>, layout: RegionLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    /// Collect matching artifacts without descending into bytecode
    /// directories. Fails only when the root itself cannot be read.
    fn collect(&self) -> Result<(Vec<Artifact>, Vec<CacheError>), CacheError> {
        let mut artifacts = Vec::new();
        let mut skipped = Vec::new();

        match fs::read_dir(&self.root) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok((artifacts, skipped)),
            Err(e) => {
                return Err(CacheError::RootUnreadable {
                    path: self.root.clone(),
                    source: e,
                })
            }
        }

        let mut walker = WalkDir::new(&self.root).follow_links(false).into_iter();
        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let err = CacheError::from_walk(&self.root, e);
                    debug!(error = %err, "skipping unreadable entry");
                    skipped.push(err);
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }

            let file_type = entry.file_type();
            if file_type.is_dir() && self.layout.is_bytecode_dir(entry.file_name()) {
                walker.skip_current_dir();
                artifacts.push(Artifact::Dir(entry.into_path()));
            } else if file_type.is_file() && self.layout.is_bytecode_file(entry.file_name()) {
                artifacts.push(Artifact::File(entry.into_path()));
            }
        }

        Ok((artifacts, skipped))
    }

    /// Empty a bytecode directory contents-first, then remove it. Links
    /// inside are removed as links.
    fn remove_tree(dir: &Path, removal: &mut Removal) {
        for entry in WalkDir::new(dir).follow_links(false).contents_first(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    removal.record_failure(CacheError::from_walk(dir, e));
                    continue;
                }
            };
            let path = entry.path();
            let result = if entry.file_type().is_dir() {
                fs::remove_dir(path).map(|_| 0)
            } else {
                let size = if entry.file_type().is_file() {
                    entry.metadata().map(|m| m.len()).unwrap_or(0)
                } else {
                    0
                };
                fs::remove_file(path).map(|_| size)
            };
            match result {
                Ok(freed) => {
                    removal.items += 1;
                    removal.bytes += freed;
                }
                Err(e) => removal.record_failure(CacheError::from_remove(path, e)),
            }
        }
    }
}

fn is_artifact(layout: &RegionLayout, entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    (file_type.is_dir() && layout.is_bytecode_dir(entry.file_name()))
        || (file_type.is_file() && layout.is_bytecode_file(entry.file_name()))
}

/// At least one bytecode artifact exists under `root`.
fn has_artifacts(root: &Path, layout: &RegionLayout) -> bool {
    WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .any(|e| is_artifact(layout, &e))
}

impl Cleaner for SystemBytecode {
    fn region(&self) -> RegionKind {
        RegionKind::SystemBytecode
    }

    fn measure(&self) -> Measurement {
        let mut measurement = Measurement::default();
        let (artifacts, skipped) = match self.collect() {
            Ok(found) => found,
            Err(e) => {
                measurement.skip(e);
                return measurement;
            }
        };
        for err in skipped {
            measurement.skip(err);
        }

        for artifact in artifacts {
            match artifact {
                Artifact::File(path) => match path.symlink_metadata() {
                    Ok(meta) => {
                        measurement.bytes += meta.len();
                        measurement.files += 1;
                    }
                    Err(e) => measurement.skip(CacheError::from_io(&path, e)),
                },
                Artifact::Dir(path) => {
                    let inner = utils::measure_dir(&path);
                    measurement.bytes += inner.bytes;
                    measurement.files += inner.files;
                    measurement.skipped.extend(inner.skipped);
                }
            }
        }

        measurement
    }

    fn exists(&self) -> bool {
        has_artifacts(&self.root, &self.layout)
    }

    fn clear(&self) -> ClearOutcome {
        let (artifacts, skipped) = match self.collect() {
            Ok(found) => found,
            Err(e) => {
                return ClearOutcome::failed(self.region(), 0, 0, e.to_string(), vec![e]);
            }
        };

        let mut removal = Removal::default();
        for artifact in artifacts {
            match artifact {
                Artifact::File(path) => {
                    let size = path.symlink_metadata().map(|m| m.len()).unwrap_or(0);
                    match fs::remove_file(&path) {
                        Ok(()) => {
                            removal.items += 1;
                            removal.bytes += size;
                        }
                        Err(e) => removal.record_failure(CacheError::from_remove(&path, e)),
                    }
                }
                Artifact::Dir(path) => Self::remove_tree(&path, &mut removal),
            }
        }

        let message = if removal.failures.is_empty() {
            format!("{} items removed", removal.items)
        } else {
            format!(
                "{} items removed, {} skipped",
                removal.items,
                removal.failures.len()
            )
        };

        ClearOutcome::succeeded(self.region(), removal.items, removal.bytes, message)
            .with_skipped(removal.failures)
            .with_skipped(skipped)
    }
}
