use std::ffi::OsStr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_CACHE_DIR: &str = "flask_cache";
pub const DEFAULT_TEMP_DIR: &str = "static/uploads/temp";
pub const DEFAULT_BYTECODE_SUFFIX: &str = ".pyc";
pub const DEFAULT_BYTECODE_DIR: &str = "__pycache__";

/// Where each cache region lives relative to the application root, and how
/// bytecode artifacts are recognised.
///
/// Fixed at construction; the manager never re-reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionLayout {
    pub page_cache_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub bytecode_suffix: String,
    pub bytecode_dir: String,
}

impl Default for RegionLayout {
    fn default() -> Self {
        Self {
            page_cache_dir: PathBuf::from(DEFAULT_PAGE_CACHE_DIR),
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
            bytecode_suffix: DEFAULT_BYTECODE_SUFFIX.to_string(),
            bytecode_dir: DEFAULT_BYTECODE_DIR.to_string(),
        }
    }
}

impl RegionLayout {
    pub fn with_page_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.page_cache_dir = dir.into();
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Compiled artifact by file name suffix.
    pub fn is_bytecode_file(&self, name: &OsStr) -> bool {
        !self.bytecode_suffix.is_empty() && name.to_string_lossy().ends_with(&self.bytecode_suffix)
    }

    /// Interpreter bytecode cache directory by exact name.
    pub fn is_bytecode_dir(&self, name: &OsStr) -> bool {
        name == OsStr::new(&self.bytecode_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_web_app_conventions() {
        let layout = RegionLayout::default();
        assert_eq!(layout.page_cache_dir, PathBuf::from("flask_cache"));
        assert_eq!(layout.temp_dir, PathBuf::from("static/uploads/temp"));
        assert!(layout.is_bytecode_file(OsStr::new("views.cpython-312.pyc")));
        assert!(!layout.is_bytecode_file(OsStr::new("views.py")));
        assert!(layout.is_bytecode_dir(OsStr::new("__pycache__")));
        assert!(!layout.is_bytecode_dir(OsStr::new("__pycache__.bak")));
    }

    #[test]
    fn partial_layout_deserializes_with_defaults() {
        let layout: RegionLayout =
            serde_json::from_str(r#"{"page_cache_dir": "cache/pages"}"#).unwrap();
        assert_eq!(layout.page_cache_dir, PathBuf::from("cache/pages"));
        assert_eq!(layout.temp_dir, PathBuf::from(DEFAULT_TEMP_DIR));
        assert_eq!(layout.bytecode_dir, DEFAULT_BYTECODE_DIR);
    }
}
