use std::ffi::CString;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiskInfo {
    pub total: u64,
    pub available: u64,
    pub used: u64,
}

impl DiskInfo {
    pub fn usage_percent(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.used as f32 / self.total as f32 * 100.0
    }
}

/// Capacity of the filesystem holding `path`.
pub fn get_disk_info(path: &Path) -> Option<DiskInfo> {
    let c_path = CString::new(path.as_os_str().as_bytes()).ok()?;
    let mut stat = MaybeUninit::<libc::statvfs>::uninit();
    let ret = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if ret != 0 {
        return None;
    }
    let stat = unsafe { stat.assume_init() };
    let block_size = stat.f_frsize as u64;
    let total = stat.f_blocks as u64 * block_size;
    let available = stat.f_bavail as u64 * block_size;
    let used = total.saturating_sub(available);
    Some(DiskInfo {
        total,
        available,
        used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_filesystem_has_capacity() {
        let info = get_disk_info(Path::new("/")).unwrap();
        assert!(info.total > 0);
        assert!(info.used <= info.total);
        assert!((0.0..=100.0).contains(&info.usage_percent()));
    }

    #[test]
    fn missing_path_has_no_info() {
        assert!(get_disk_info(Path::new("/definitely/not/here")).is_none());
    }

    #[test]
    fn empty_disk_reports_zero_usage() {
        let info = DiskInfo {
            total: 0,
            available: 0,
            used: 0,
        };
        assert_eq!(info.usage_percent(), 0.0);
    }
}
