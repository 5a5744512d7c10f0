//! Report command: summarize the cached dataset.

use crate::{GlobalArgs, ReportFormat};
use anyhow::{Context, Result};
use perfsweep_analysis::{Dataset, Report};

/// Print the duration and IPC series of every cached record.
pub fn report(global: &GlobalArgs, format: ReportFormat) -> Result<()> {
    let dataset = Dataset::load(&global.cache_dir)
        .with_context(|| format!("Failed to load results from {}", global.cache_dir.display()))?;

    if dataset.is_empty() {
        println!("No results in {}. Run `perfsweep sweep` first.", global.cache_dir.display());
        return Ok(());
    }

    let report = Report::new(&dataset);
    match format {
        ReportFormat::Text => print!("{}", report.to_text()),
        ReportFormat::Json => println!("{}", report.to_json()?),
    }
    Ok(())
}
