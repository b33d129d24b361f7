//! Types for operations and results

use modman_install::PatchReport;
use modman_types::{Category, PackageRecord, Version};
use serde::Serialize;

/// Package row for search and list output
#[derive(Clone, Debug, Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: Version,
    /// Installed version, when it differs from `version` or the row is remote
    pub installed_version: Option<Version>,
    pub category: Category,
    pub status: &'static str,
    pub dependencies: Vec<String>,
}

impl PackageInfo {
    #[must_use]
    pub fn from_record(record: &PackageRecord) -> Self {
        Self {
            name: record.name.clone(),
            version: record.version.clone(),
            installed_version: None,
            category: record.category,
            status: record.status_label(),
            dependencies: record.dependencies.clone(),
        }
    }
}

/// Outcome of [`crate::refresh`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub local: usize,
    pub remote: usize,
    /// Packages flagged for update
    pub updates: Vec<String>,
}

/// Outcome of [`crate::clean_reinstall`]
#[derive(Clone, Debug, Default)]
pub struct ReinstallReport {
    /// Packages captured for reinstallation
    pub packages: Vec<String>,
    pub removal: PatchReport,
    pub install: PatchReport,
}

impl ReinstallReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.removal.is_success() && self.install.is_success()
    }
}
