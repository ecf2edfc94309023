use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CompromisedFinding, InstalledPackage, PackageManager};

/// Results for one manifest or lockfile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Path relative to the scan root.
    #[serde(rename = "file")]
    pub file_path: String,
    pub package_manager: PackageManager,
    #[serde(rename = "compromisedPackages")]
    pub findings: Vec<CompromisedFinding>,
    #[serde(rename = "installedPackages")]
    pub installed: Vec<InstalledPackage>,
}

impl ScanResult {
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty()
    }
}

/// Project-wide scan results handed to reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub scan_time: DateTime<Utc>,
    #[serde(rename = "totalFiles")]
    pub total_files_scanned: usize,
    #[serde(rename = "compromisedFiles")]
    pub files_with_findings: usize,
    /// Deduplicated across files by `(name, version)`.
    #[serde(rename = "compromisedPackages")]
    pub unique_findings: Vec<CompromisedFinding>,
    #[serde(rename = "usingCachedList")]
    pub used_fallback_registry: bool,
    #[serde(rename = "scanResults")]
    pub results: Vec<ScanResult>,
}

impl ScanSummary {
    pub fn has_findings(&self) -> bool {
        !self.unique_findings.is_empty()
    }

    /// Per-file results that contain at least one finding.
    pub fn results_with_findings(&self) -> impl Iterator<Item = &ScanResult> {
        self.results.iter().filter(|r| r.has_findings())
    }
}
