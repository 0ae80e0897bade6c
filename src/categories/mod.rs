mod bytecode;
mod page_cache;
mod temp_uploads;

use std::path::PathBuf;

pub use bytecode::SystemBytecode;
pub use page_cache::FrameworkPageCache;
pub use temp_uploads::{TempUploads, DEFAULT_STALE_AGE};

use crate::cleaner::Cleaner;
use crate::config::RegionLayout;
use crate::region::{RegionKind, RegionLocator};

/// Cleaner for `kind` rooted at an already resolved region path.
pub fn cleaner_at(kind: RegionKind, path: PathBuf, layout: &RegionLayout) -> Box<dyn Cleaner> {
    match kind {
        RegionKind::SystemBytecode => Box::new(SystemBytecode::new(path, layout.clone())),
        RegionKind::FrameworkPageCache => Box::new(FrameworkPageCache::new(path)),
        RegionKind::TempUploads => Box::new(TempUploads::new(path)),
    }
}

pub fn cleaner_for(kind: RegionKind, locator: &RegionLocator) -> Box<dyn Cleaner> {
    cleaner_at(kind, locator.path(kind), locator.layout())
}

/// One cleaner per region, in clearing order.
pub fn all_cleaners(locator: &RegionLocator) -> Vec<Box<dyn Cleaner>> {
    RegionKind::ALL
        .iter()
        .map(|&kind| cleaner_for(kind, locator))
        .collect()
}
