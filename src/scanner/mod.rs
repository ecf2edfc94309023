//! Project scanning.
//!
//! [`ScanEngine`] ties the pieces together in one linear pass:
//!
//! 1. resolve the compromised registry ([`RegistryResolver`])
//! 2. discover dependency files under the root ([`discover_files`])
//! 3. parse and match each file, one at a time, in format order
//! 4. aggregate the per-file results into a [`ScanSummary`]
//!
//! # Example
//!
//! ```no_run
//! use pkgscan::{Config, ScanEngine};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let engine = ScanEngine::from_config(&config);
//!     let summary = engine.scan(Path::new(".")).await?;
//!     println!("{} compromised packages", summary.unique_findings.len());
//!     Ok(())
//! }
//! ```

mod discovery;

pub use discovery::{discover_files, validate_root, DiscoveredFile};

use chrono::Utc;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::cache::RegistryCache;
use crate::config::Config;
use crate::error::ScanError;
use crate::matcher::match_findings;
use crate::model::{CompromisedFinding, ScanResult, ScanSummary};
use crate::registry::{RegistryResolver, ResolvedRegistry};

/// Inputs for a scan besides the root directory.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub registry_url: String,
    pub additional_packages: Vec<String>,
    pub exclude_directories: Vec<String>,
}

impl From<&Config> for ScanOptions {
    fn from(config: &Config) -> Self {
        Self {
            registry_url: config.registry_url.clone(),
            additional_packages: config.additional_packages.clone(),
            exclude_directories: config.exclude_directories.clone(),
        }
    }
}

pub struct ScanEngine {
    resolver: RegistryResolver,
    options: ScanOptions,
}

impl ScanEngine {
    pub fn new(resolver: RegistryResolver, options: ScanOptions) -> Self {
        Self { resolver, options }
    }

    /// Builds an engine with the HTTP fetcher and the default cache location.
    pub fn from_config(config: &Config) -> Self {
        let cache = RegistryCache::with_timeout_minutes(config.cache_timeout());
        Self::new(RegistryResolver::http(cache), ScanOptions::from(config))
    }

    /// Resolves the registry and scans `root`.
    ///
    /// # Errors
    ///
    /// Fails only when `root` cannot be enumerated. Registry and per-file
    /// problems are logged and recovered.
    pub async fn scan(&self, root: &Path) -> Result<ScanSummary, ScanError> {
        validate_root(root)?;

        let resolved = self
            .resolver
            .resolve(
                &self.options.registry_url,
                &self.options.additional_packages,
            )
            .await;

        scan_with_registry(root, &self.options.exclude_directories, &resolved).await
    }
}

/// Scans `root` against an already resolved registry.
pub async fn scan_with_registry(
    root: &Path,
    exclude: &[String],
    resolved: &ResolvedRegistry,
) -> Result<ScanSummary, ScanError> {
    tracing::info!(root = %root.display(), "scanning for compromised packages");

    let files = {
        let root: PathBuf = root.to_path_buf();
        let exclude = exclude.to_vec();
        tokio::task::spawn_blocking(move || discover_files(&root, &exclude)).await??
    };

    let total_files = files.len();
    let mut results = Vec::new();
    let base = std::env::current_dir().ok();

    for file in &files {
        if let Some(result) = scan_file(base.as_deref(), file, resolved).await {
            results.push(result);
        }
    }

    let summary = summarize(results, total_files, resolved.used_fallback());
    tracing::info!(
        total_files = summary.total_files_scanned,
        files_with_findings = summary.files_with_findings,
        unique_findings = summary.unique_findings.len(),
        "scan complete"
    );
    Ok(summary)
}

async fn scan_file(
    base: Option<&Path>,
    file: &DiscoveredFile,
    resolved: &ResolvedRegistry,
) -> Option<ScanResult> {
    let content = match tokio::fs::read_to_string(&file.path).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %file.path.display(), error = %e, "could not read file");
            return None;
        }
    };

    let installed = file.format.parser().parse(&content);
    let findings = match_findings(&installed, resolved);

    tracing::debug!(
        path = %file.path.display(),
        installed = installed.len(),
        findings = findings.len(),
        "parsed dependency file"
    );

    // Empty or unparseable files are left out of the report.
    if installed.is_empty() && findings.is_empty() {
        return None;
    }

    Some(ScanResult {
        file_path: display_path(base, &file.path),
        package_manager: file.format.package_manager(),
        findings,
        installed,
    })
}

/// Renders `path` relative to the invocation directory `base`.
///
/// Relative paths already are; absolute paths outside `base` stay absolute.
fn display_path(base: Option<&Path>, path: &Path) -> String {
    let relative = match base {
        Some(base) if path.is_absolute() => path.strip_prefix(base).unwrap_or(path),
        _ => path,
    };

    relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect::<PathBuf>()
        .to_string_lossy()
        .into_owned()
}

/// Aggregates per-file results into the project summary.
///
/// Findings are deduplicated by `(name, version)`; the first occurrence is
/// kept, including its provenance.
pub fn summarize(results: Vec<ScanResult>, total_files: usize, used_fallback: bool) -> ScanSummary {
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
    let mut unique: Vec<CompromisedFinding> = Vec::new();

    for finding in results.iter().flat_map(|r| &r.findings) {
        if seen.insert((finding.name.clone(), finding.version.clone())) {
            unique.push(finding.clone());
        }
    }

    ScanSummary {
        scan_time: Utc::now(),
        total_files_scanned: total_files,
        files_with_findings: results.iter().filter(|r| r.has_findings()).count(),
        unique_findings: unique,
        used_fallback_registry: used_fallback,
        results,
    }
}
