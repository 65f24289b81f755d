//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a harvest
//! run, written next to the collection when `output.summary-path` is set.

use crate::output::stats::RunReport;
use crate::output::traits::{OutputError, OutputResult};
use crate::state::StopReason;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Generates a markdown summary of a run
///
/// # Arguments
///
/// * `report` - The finished run's report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(report: &RunReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(report);

    let io_err = |source| OutputError::Io {
        path: output_path.to_path_buf(),
        source,
    };
    let mut file = File::create(output_path).map_err(io_err)?;
    file.write_all(markdown.as_bytes()).map_err(io_err)?;

    Ok(())
}

/// Formats a run report as markdown
pub fn format_markdown_summary(report: &RunReport) -> String {
    let stats = &report.stats;
    let mut md = String::new();

    md.push_str("# Story Harvest Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        report.duration_seconds()
    ));
    md.push_str(&format!("- **Output**: {}\n", report.output_path.display()));
    md.push_str(&format!("- **Publish**: {}\n\n", report.publish));

    md.push_str("## Totals\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Pages visited | {} |\n", stats.pages_visited));
    md.push_str(&format!("| Empty pages | {} |\n", stats.empty_pages));
    md.push_str(&format!("| Items seen | {} |\n", stats.items_seen));
    md.push_str(&format!("| Items persisted | {} |\n", stats.items_persisted));
    md.push_str(&format!("| Items skipped | {} |\n", stats.items_skipped));
    md.push_str(&format!("| Chapters | {} |\n", stats.chapters_collected));
    md.push_str(&format!("| Images | {} |\n\n", stats.images_collected));

    if !stats.stop_reasons.is_empty() {
        md.push_str("## Chapter Loop Endings\n\n");
        md.push_str("| Reason | Items |\n");
        md.push_str("|--------|-------|\n");
        for reason in StopReason::all() {
            md.push_str(&format!("| {} | {} |\n", reason, stats.stopped_by(reason)));
        }
        md.push('\n');
    }

    md
}
