mod cli;
mod github;
mod json;

pub use cli::print_cli_table;
pub use github::{print_github, write_github_output};
pub use json::print_json;

use crate::config::Severity;
use crate::model::ScanSummary;
use anyhow::Result;

/// Output format for scan results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format for programmatic use
    Json,
    /// GitHub Actions workflow commands
    Github,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "github" | "gha" => Ok(OutputFormat::Github),
            _ => Err(format!(
                "Unknown format: {}. Use 'table', 'json', or 'github'",
                s
            )),
        }
    }
}

pub fn print_result(summary: &ScanSummary, format: OutputFormat, severity: Severity) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_table(summary),
        OutputFormat::Json => print_json(summary),
        OutputFormat::Github => print_github(summary, severity),
    }
}

/// Format result to string for file output
pub fn format_result_to_string(
    summary: &ScanSummary,
    format: OutputFormat,
    severity: Severity,
) -> Result<String> {
    match format {
        OutputFormat::Github => Ok(github::generate_annotations(summary, severity)),
        // Tables are for terminals; files get JSON.
        OutputFormat::Json | OutputFormat::Table => Ok(serde_json::to_string_pretty(summary)?),
    }
}
