//! GitHub Actions output.
//!
//! Each finding becomes a workflow command annotation on the file that
//! declared it:
//!
//! ```text
//! ::error file=apps/web/package.json::Compromised package evil-pkg@1.0.0 (remote)
//! ```
//!
//! When `GITHUB_OUTPUT` names a file, the summary counts are appended to it
//! as step outputs.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::config::Severity;
use crate::model::ScanSummary;

pub fn print_github(summary: &ScanSummary, severity: Severity) -> Result<()> {
    print!("{}", generate_annotations(summary, severity));

    if let Some(path) = std::env::var_os("GITHUB_OUTPUT") {
        write_github_output(summary, Path::new(&path))?;
    }
    Ok(())
}

pub(crate) fn generate_annotations(summary: &ScanSummary, severity: Severity) -> String {
    let level = command_level(severity);
    let mut out = String::new();

    for result in summary.results_with_findings() {
        for finding in &result.findings {
            out.push_str(&format!(
                "::{} file={}::{}\n",
                level,
                escape_property(&result.file_path),
                escape_data(&format!(
                    "Compromised package {} ({})",
                    finding.display_id(),
                    finding.provenance
                ))
            ));
        }
    }

    if summary.used_fallback_registry {
        out.push_str(
            "::warning::Remote compromised package list unavailable; used cached or built-in list\n",
        );
    }

    out.push_str(&format!(
        "::notice::Scanned {} files, {} with findings, {} unique compromised packages\n",
        summary.total_files_scanned,
        summary.files_with_findings,
        summary.unique_findings.len()
    ));

    out
}

/// Appends step outputs to the `GITHUB_OUTPUT` file.
pub fn write_github_output(summary: &ScanSummary, path: &Path) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open GITHUB_OUTPUT file {}", path.display()))?;

    writeln!(file, "compromised-count={}", summary.unique_findings.len())?;
    writeln!(file, "files-with-findings={}", summary.files_with_findings)?;
    writeln!(file, "total-files={}", summary.total_files_scanned)?;
    writeln!(file, "used-fallback-list={}", summary.used_fallback_registry)?;
    Ok(())
}

fn command_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "notice",
    }
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}
