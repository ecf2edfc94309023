use crate::model::{CompromisedFinding, ScanSummary};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct FindingRow {
    #[tabled(rename = "Package")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Source")]
    provenance: String,
}

impl From<&CompromisedFinding> for FindingRow {
    fn from(finding: &CompromisedFinding) -> Self {
        Self {
            name: truncate(&finding.name, 50),
            version: format_version(finding.version.as_deref()),
            provenance: finding.provenance.to_string(),
        }
    }
}

pub fn print_cli_table(summary: &ScanSummary) -> Result<()> {
    print!("{}", render_table(summary));
    Ok(())
}

pub(crate) fn render_table(summary: &ScanSummary) -> String {
    let mut out = String::new();

    out.push('\n');
    out.push_str(&format!(
        "Scan completed at: {}\n",
        summary.scan_time.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if summary.used_fallback_registry {
        out.push_str(
            "\x1b[33mWarning:\x1b[0m the remote compromised package list was unavailable; \
             results use a cached or built-in list\n",
        );
    }
    out.push('\n');

    if summary.has_findings() {
        for result in summary.results_with_findings() {
            out.push_str(&format!(
                "{} ({}): {} compromised\n",
                result.file_path,
                result.package_manager,
                result.findings.len()
            ));
            let rows: Vec<FindingRow> = result.findings.iter().map(FindingRow::from).collect();
            out.push_str(&Table::new(rows).with(Style::rounded()).to_string());
            out.push_str("\n\n");
        }
    } else {
        out.push_str("\x1b[32mNo compromised packages found.\x1b[0m\n\n");
    }

    out.push_str("Summary:\n");
    out.push_str(&format!(
        "  Files scanned: {}\n",
        summary.total_files_scanned
    ));
    out.push_str(&format!(
        "  Files with findings: {}\n",
        summary.files_with_findings
    ));
    out.push_str(&format!(
        "  Compromised packages: {}\n",
        summary.unique_findings.len()
    ));

    out
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

/// Name-only findings match every version.
fn format_version(version: Option<&str>) -> String {
    version.unwrap_or("*").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PackageManager, Provenance, ScanResult};
    use chrono::Utc;

    fn summary(findings: Vec<CompromisedFinding>, used_fallback: bool) -> ScanSummary {
        let result = ScanResult {
            file_path: "apps/web/package.json".to_string(),
            package_manager: PackageManager::Npm,
            findings: findings.clone(),
            installed: Vec::new(),
        };
        ScanSummary {
            scan_time: Utc::now(),
            total_files_scanned: 3,
            files_with_findings: usize::from(!findings.is_empty()),
            unique_findings: findings,
            used_fallback_registry: used_fallback,
            results: vec![result],
        }
    }

    #[test]
    fn test_render_findings() {
        let out = render_table(&summary(
            vec![
                CompromisedFinding::new("evil-pkg", Some("1.0.0".to_string()), Provenance::Remote),
                CompromisedFinding::new("badlib", None, Provenance::Additional),
            ],
            false,
        ));

        assert!(out.contains("apps/web/package.json (npm): 2 compromised"));
        assert!(out.contains("evil-pkg"));
        assert!(out.contains("1.0.0"));
        assert!(out.contains("additional"));
        assert!(out.contains("*"));
        assert!(out.contains("Compromised packages: 2"));
        assert!(!out.contains("Warning:"));
    }

    #[test]
    fn test_render_clean_with_fallback() {
        let out = render_table(&summary(Vec::new(), true));

        assert!(out.contains("No compromised packages found."));
        assert!(out.contains("Warning:"));
        assert!(out.contains("Files scanned: 3"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-very-long-package-name", 10), "a-very-...");
    }
}
