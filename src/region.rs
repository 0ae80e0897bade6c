use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::categories;
use crate::cleaner::SizeReport;
use crate::config::RegionLayout;

/// Logical cache zones, in the order they are reported and cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionKind {
    #[serde(rename = "system")]
    SystemBytecode,
    #[serde(rename = "framework")]
    FrameworkPageCache,
    #[serde(rename = "temp")]
    TempUploads,
}

impl RegionKind {
    pub const ALL: [RegionKind; 3] = [
        RegionKind::SystemBytecode,
        RegionKind::FrameworkPageCache,
        RegionKind::TempUploads,
    ];

    /// Machine-readable name used by `--region`.
    pub fn name(self) -> &'static str {
        match self {
            RegionKind::SystemBytecode => "system",
            RegionKind::FrameworkPageCache => "framework",
            RegionKind::TempUploads => "temp",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RegionKind::SystemBytecode => "System cache",
            RegionKind::FrameworkPageCache => "Framework cache",
            RegionKind::TempUploads => "Temporary files",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" | "bytecode" => Ok(RegionKind::SystemBytecode),
            "framework" | "flask" | "page-cache" => Ok(RegionKind::FrameworkPageCache),
            "temp" | "uploads" => Ok(RegionKind::TempUploads),
            other => Err(format!(
                "unknown region '{other}' (expected one of: system, framework, temp)"
            )),
        }
    }
}

/// A region resolved against an application root.
#[derive(Debug, Clone)]
pub struct CacheRegion {
    pub kind: RegionKind,
    /// For the bytecode region this is the scan root, not a cache directory.
    pub path: PathBuf,
    layout: RegionLayout,
}

impl CacheRegion {
    /// Whether the region is currently present. Checked against the
    /// filesystem on every call.
    pub fn exists(&self) -> bool {
        categories::cleaner_at(self.kind, self.path.clone(), &self.layout).exists()
    }
}

/// Maps region names to paths under one application root.
#[derive(Debug, Clone)]
pub struct RegionLocator {
    root: PathBuf,
    layout: RegionLayout,
}

impl RegionLocator {
    pub fn new(root: impl Into<PathBuf>, layout: RegionLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &RegionLayout {
        &self.layout
    }

    pub fn path(&self, kind: RegionKind) -> PathBuf {
        match kind {
            RegionKind::SystemBytecode => self.root.clone(),
            RegionKind::FrameworkPageCache => self.root.join(&self.layout.page_cache_dir),
            RegionKind::TempUploads => self.root.join(&self.layout.temp_dir),
        }
    }

    pub fn region(&self, kind: RegionKind) -> CacheRegion {
        CacheRegion {
            kind,
            path: self.path(kind),
            layout: self.layout.clone(),
        }
    }

    pub fn exists(&self, kind: RegionKind) -> bool {
        categories::cleaner_for(kind, self).exists()
    }

    pub fn region_size(&self, kind: RegionKind) -> SizeReport {
        categories::cleaner_for(kind, self).size_report()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("system".parse::<RegionKind>(), Ok(RegionKind::SystemBytecode));
        assert_eq!("Flask".parse::<RegionKind>(), Ok(RegionKind::FrameworkPageCache));
        assert_eq!("uploads".parse::<RegionKind>(), Ok(RegionKind::TempUploads));
        assert!("all".parse::<RegionKind>().is_err());
        for kind in RegionKind::ALL {
            assert_eq!(kind.name().parse::<RegionKind>(), Ok(kind));
        }
    }

    #[test]
    fn resolves_paths_under_root() {
        let locator = RegionLocator::new("/srv/app", RegionLayout::default());
        assert_eq!(locator.path(RegionKind::SystemBytecode), PathBuf::from("/srv/app"));
        assert_eq!(
            locator.path(RegionKind::FrameworkPageCache),
            PathBuf::from("/srv/app/flask_cache")
        );
        assert_eq!(
            locator.path(RegionKind::TempUploads),
            PathBuf::from("/srv/app/static/uploads/temp")
        );
    }

    #[test]
    fn existence_is_recomputed_each_call() {
        let dir = TempDir::new().unwrap();
        let locator = RegionLocator::new(dir.path(), RegionLayout::default());
        let region = locator.region(RegionKind::FrameworkPageCache);

        assert!(!region.exists());
        fs::create_dir_all(dir.path().join("flask_cache")).unwrap();
        assert!(region.exists());
        fs::remove_dir(dir.path().join("flask_cache")).unwrap();
        assert!(!region.exists());
    }

    #[test]
    fn bytecode_region_exists_only_with_artifacts() {
        let dir = TempDir::new().unwrap();
        let locator = RegionLocator::new(dir.path(), RegionLayout::default());
        fs::create_dir_all(dir.path().join("app")).unwrap();
        fs::write(dir.path().join("app/views.py"), "x = 1").unwrap();
        assert!(!locator.exists(RegionKind::SystemBytecode));

        fs::create_dir_all(dir.path().join("app/__pycache__")).unwrap();
        assert!(locator.exists(RegionKind::SystemBytecode));
        assert!(locator.region(RegionKind::SystemBytecode).exists());
    }

    #[cfg(unix)]
    #[test]
    fn linked_region_dirs_do_not_exist() {
        let outside = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("static/uploads")).unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("flask_cache")).unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("static/uploads/temp")).unwrap();

        let locator = RegionLocator::new(dir.path(), RegionLayout::default());
        for kind in [RegionKind::FrameworkPageCache, RegionKind::TempUploads] {
            assert!(!locator.region(kind).exists());
            assert!(!locator.exists(kind));
        }
    }
}
