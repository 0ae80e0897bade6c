//! Disk accounting and cleanup for the cache regions of a web application.
//!
//! Three regions are managed under one application root:
//!
//! - **system**: interpreter bytecode (`*.pyc` files and `__pycache__` directories)
//!   scattered through the tree
//! - **framework**: the framework page cache directory (`flask_cache/`)
//! - **temp**: upload staging files (`static/uploads/temp/`)
//!
//! ```no_run
//! use tidycache::CacheManager;
//!
//! let manager = CacheManager::new("/srv/app");
//! println!("{:?}", manager.stats());
//! for line in manager.clear_all().summary_lines() {
//!     println!("{line}");
//! }
//! ```

pub mod categories;
pub mod cleaner;
pub mod config;
pub mod disk_info;
pub mod error;
pub mod host;
pub mod logging;
pub mod manager;
pub mod region;
pub mod utils;

pub use cleaner::{ClearAllReport, ClearOutcome, Cleaner, SizeReport};
pub use config::RegionLayout;
pub use error::CacheError;
pub use manager::{CacheManager, CacheStats};
pub use region::{CacheRegion, RegionKind, RegionLocator};
pub use utils::directory_size_mb;
