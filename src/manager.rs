//! Cache accounting and cleanup for one application root.
//!
//! [`CacheManager`] is built once with the application root and serves both
//! the read-only size queries and the clearing operations. Every operation
//! returns a structured result; filesystem errors never escape as `Err` or
//! panics.

use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

use crate::categories::{self, TempUploads};
use crate::cleaner::{ClearAllReport, ClearOutcome, SizeReport};
use crate::config::RegionLayout;
use crate::region::{CacheRegion, RegionKind, RegionLocator};

/// Region sizes formatted for the maintenance page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub system_size: String,
    pub flask_size: String,
    pub temp_size: String,
}

pub struct CacheManager {
    locator: RegionLocator,
    /// Serializes mutating calls made through this manager.
    clear_lock: Mutex<()>,
}

impl CacheManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_layout(root, RegionLayout::default())
    }

    pub fn with_layout(root: impl Into<PathBuf>, layout: RegionLayout) -> Self {
        Self {
            locator: RegionLocator::new(root, layout),
            clear_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        self.locator.root()
    }

    pub fn region(&self, kind: RegionKind) -> CacheRegion {
        self.locator.region(kind)
    }

    pub fn exists(&self, kind: RegionKind) -> bool {
        self.locator.exists(kind)
    }

    pub fn region_size(&self, kind: RegionKind) -> SizeReport {
        self.locator.region_size(kind)
    }

    /// Size of every region, in [`RegionKind::ALL`] order.
    pub fn size_reports(&self) -> Vec<SizeReport> {
        categories::all_cleaners(&self.locator)
            .iter()
            .map(|cleaner| cleaner.size_report())
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            system_size: self.region_size(RegionKind::SystemBytecode).display(),
            flask_size: self.region_size(RegionKind::FrameworkPageCache).display(),
            temp_size: self.region_size(RegionKind::TempUploads).display(),
        }
    }

    pub fn clear_region(&self, kind: RegionKind) -> ClearOutcome {
        let _guard = self.clear_lock.lock();
        categories::cleaner_for(kind, &self.locator).clear()
    }

    pub fn clear_system_cache(&self) -> ClearOutcome {
        self.clear_region(RegionKind::SystemBytecode)
    }

    pub fn clear_framework_cache(&self) -> ClearOutcome {
        self.clear_region(RegionKind::FrameworkPageCache)
    }

    pub fn clear_temp_files(&self) -> ClearOutcome {
        self.clear_region(RegionKind::TempUploads)
    }

    /// Clear every region in order. A failed region does not stop the rest.
    pub fn clear_all(&self) -> ClearAllReport {
        let _guard = self.clear_lock.lock();
        let outcomes: Vec<ClearOutcome> = categories::all_cleaners(&self.locator)
            .iter()
            .map(|cleaner| cleaner.clear())
            .collect();
        let report = ClearAllReport { outcomes };
        info!(
            items_removed = report.items_removed(),
            bytes_freed = report.bytes_freed(),
            all_succeeded = report.all_succeeded(),
            "all cache regions cleared"
        );
        report
    }

    /// Remove temp region entries untouched for longer than `max_age`.
    pub fn clear_stale_temp_files(&self, max_age: Duration) -> ClearOutcome {
        let _guard = self.clear_lock.lock();
        TempUploads::new(self.locator.path(RegionKind::TempUploads)).clear_stale(max_age)
    }
}
