use serde::Serialize;
use tracing::{info, warn};

use crate::error::CacheError;
use crate::region::RegionKind;
use crate::utils::{self, Measurement};

/// Size of one region at the time of the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeReport {
    pub region: RegionKind,
    pub size_bytes: u64,
    pub size_mb: f64,
}

impl SizeReport {
    pub fn new(region: RegionKind, size_bytes: u64) -> Self {
        Self {
            region,
            size_bytes,
            size_mb: utils::bytes_to_mb(size_bytes),
        }
    }

    /// `"<mb> MB"`, as shown on the maintenance page.
    pub fn display(&self) -> String {
        utils::format_mb(self.size_mb)
    }
}

/// Result of clearing a single region.
#[derive(Debug, Serialize)]
pub struct ClearOutcome {
    pub region: RegionKind,
    pub success: bool,
    pub items_removed: u64,
    pub bytes_freed: u64,
    pub message: String,
    /// Classified causes for skipped entries or a failed region.
    #[serde(skip)]
    pub failures: Vec<CacheError>,
}

impl ClearOutcome {
    pub fn succeeded(region: RegionKind, items_removed: u64, bytes_freed: u64, message: String) -> Self {
        let outcome = Self {
            region,
            success: true,
            items_removed,
            bytes_freed,
            message,
            failures: Vec::new(),
        };
        outcome.log();
        outcome
    }

    pub fn failed(
        region: RegionKind,
        items_removed: u64,
        bytes_freed: u64,
        message: String,
        failures: Vec<CacheError>,
    ) -> Self {
        let outcome = Self {
            region,
            success: false,
            items_removed,
            bytes_freed,
            message,
            failures,
        };
        outcome.log();
        outcome
    }

    /// Attach entries that were skipped without failing the region.
    pub fn with_skipped(mut self, skipped: Vec<CacheError>) -> Self {
        self.failures.extend(skipped);
        self
    }

    /// One line for the clear-all summary, e.g. `System cache: 10 items removed`.
    pub fn summary_line(&self) -> String {
        format!("{}: {}", self.region.label(), self.message)
    }

    fn log(&self) {
        if self.success {
            info!(
                region = %self.region,
                items_removed = self.items_removed,
                bytes_freed = self.bytes_freed,
                "region cleared"
            );
        } else {
            warn!(
                region = %self.region,
                items_removed = self.items_removed,
                message = %self.message,
                "region clear failed"
            );
        }
    }
}

/// One outcome per region, always in [`RegionKind::ALL`] order.
#[derive(Debug, Serialize)]
pub struct ClearAllReport {
    pub outcomes: Vec<ClearOutcome>,
}

impl ClearAllReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }

    pub fn items_removed(&self) -> u64 {
        self.outcomes.iter().map(|o| o.items_removed).sum()
    }

    pub fn bytes_freed(&self) -> u64 {
        self.outcomes.iter().map(|o| o.bytes_freed).sum()
    }

    pub fn summary_lines(&self) -> Vec<String> {
        self.outcomes.iter().map(ClearOutcome::summary_line).collect()
    }

    pub fn outcome(&self, region: RegionKind) -> Option<&ClearOutcome> {
        self.outcomes.iter().find(|o| o.region == region)
    }
}

/// The trait every cache region cleaner implements.
pub trait Cleaner {
    fn region(&self) -> RegionKind;

    /// Best-effort size scan. Never deletes anything.
    fn measure(&self) -> Measurement;

    /// Whether anything is currently there to clear.
    fn exists(&self) -> bool;

    /// Delete the region's artifacts. Never panics; every failure is
    /// reported through the outcome.
    fn clear(&self) -> ClearOutcome;

    fn size_report(&self) -> SizeReport {
        SizeReport::new(self.region(), self.measure().bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_report_rounds_and_displays() {
        let report = SizeReport::new(RegionKind::FrameworkPageCache, 2 * 1_048_576);
        assert_eq!(report.size_mb, 2.0);
        assert_eq!(report.display(), "2.0 MB");

        let empty = SizeReport::new(RegionKind::TempUploads, 0);
        assert_eq!(empty.display(), "0.0 MB");
    }

    #[test]
    fn report_aggregates_outcomes() {
        let report = ClearAllReport {
            outcomes: vec![
                ClearOutcome::succeeded(RegionKind::SystemBytecode, 4, 100, "4 items removed".into()),
                ClearOutcome::failed(
                    RegionKind::FrameworkPageCache,
                    0,
                    0,
                    "permission denied".into(),
                    Vec::new(),
                ),
                ClearOutcome::succeeded(RegionKind::TempUploads, 2, 50, "2 files removed".into()),
            ],
        };

        assert!(!report.all_succeeded());
        assert_eq!(report.items_removed(), 6);
        assert_eq!(report.bytes_freed(), 150);
        assert_eq!(
            report.summary_lines(),
            vec![
                "System cache: 4 items removed",
                "Framework cache: permission denied",
                "Temporary files: 2 files removed",
            ]
        );
        assert!(!report.outcome(RegionKind::FrameworkPageCache).unwrap().success);
    }

    #[test]
    fn outcome_serializes_without_failures() {
        let outcome =
            ClearOutcome::succeeded(RegionKind::TempUploads, 1, 10, "1 files removed".into());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["region"], "temp");
        assert_eq!(json["success"], true);
        assert_eq!(json["items_removed"], 1);
        assert!(json.get("failures").is_none());
    }
}
