use crate::model::ScanSummary;
use anyhow::Result;

pub fn print_json(summary: &ScanSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    println!("{}", json);
    Ok(())
}
